//! Brandes' betweenness centrality (unweighted), normalized by
//! `(n-1)(n-2)` (spec §4.F).

use super::Adjacency;
use std::collections::{BTreeMap, VecDeque};

pub fn betweenness_centrality(adjacency: &Adjacency) -> BTreeMap<String, f64> {
    let nodes: Vec<&String> = adjacency.keys().collect();
    let n = nodes.len();
    let mut centrality: BTreeMap<String, f64> = nodes.iter().map(|n| ((*n).clone(), 0.0)).collect();
    if n < 3 {
        return centrality;
    }

    for source in &nodes {
        let mut stack = Vec::new();
        let mut predecessors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut sigma: BTreeMap<&str, f64> = nodes.iter().map(|n| (n.as_str(), 0.0)).collect();
        let mut dist: BTreeMap<&str, i64> = nodes.iter().map(|n| (n.as_str(), -1)).collect();
        sigma.insert(source.as_str(), 1.0);
        dist.insert(source.as_str(), 0);

        let mut queue = VecDeque::new();
        queue.push_back(source.as_str());

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            if let Some(neighbors) = adjacency.get(v) {
                for w in neighbors {
                    let w = w.as_str();
                    if dist[w] < 0 {
                        dist.insert(w, dist[v] + 1);
                        queue.push_back(w);
                    }
                    if dist[w] == dist[v] + 1 {
                        sigma.insert(w, sigma[w] + sigma[v]);
                        predecessors.entry(w).or_default().push(v);
                    }
                }
            }
        }

        let mut delta: BTreeMap<&str, f64> = nodes.iter().map(|n| (n.as_str(), 0.0)).collect();
        while let Some(w) = stack.pop() {
            if let Some(preds) = predecessors.get(w) {
                for v in preds {
                    let contribution = (sigma[*v] / sigma[w]) * (1.0 + delta[w]);
                    delta.insert(*v, delta[*v] + contribution);
                }
            }
            if w != source.as_str() {
                *centrality.get_mut(w).unwrap() += delta[w];
            }
        }
    }

    let norm = ((n - 1) * (n - 2)) as f64;
    for score in centrality.values_mut() {
        *score /= norm;
    }
    centrality
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adj(pairs: &[(&str, &[&str])]) -> Adjacency {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn bridge_node_has_highest_betweenness() {
        // a - bridge - b, a - bridge - c: bridge sits on every shortest path
        let graph = adj(&[
            ("a", &["bridge"]),
            ("bridge", &["a", "b", "c"]),
            ("b", &["bridge"]),
            ("c", &["bridge"]),
        ]);
        let scores = betweenness_centrality(&graph);
        assert!(scores["bridge"] > scores["a"]);
        assert!(scores["bridge"] > scores["b"]);
    }

    #[test]
    fn fully_connected_triangle_has_zero_betweenness() {
        let graph = adj(&[("a", &["b", "c"]), ("b", &["a", "c"]), ("c", &["a", "b"])]);
        let scores = betweenness_centrality(&graph);
        for score in scores.values() {
            assert!((*score).abs() < 1e-9);
        }
    }

    #[test]
    fn fewer_than_three_nodes_returns_zeros() {
        let graph = adj(&[("a", &["b"]), ("b", &["a"])]);
        let scores = betweenness_centrality(&graph);
        assert_eq!(scores["a"], 0.0);
        assert_eq!(scores["b"], 0.0);
    }
}
