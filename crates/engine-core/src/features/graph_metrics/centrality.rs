//! Closeness and eigenvector centrality, used as auxiliary signals in the
//! unified importance profile (spec §4.F).

use super::Adjacency;
use std::collections::{BTreeMap, VecDeque};

/// Closeness centrality: `(reachable-1) / sum(distances)`, restricted to the
/// reachable set (standard handling for disconnected graphs).
pub fn closeness_centrality(adjacency: &Adjacency) -> BTreeMap<String, f64> {
    let mut result = BTreeMap::new();
    for source in adjacency.keys() {
        let mut dist: BTreeMap<&str, i64> = BTreeMap::new();
        dist.insert(source.as_str(), 0);
        let mut queue = VecDeque::new();
        queue.push_back(source.as_str());
        while let Some(v) = queue.pop_front() {
            if let Some(neighbors) = adjacency.get(v) {
                for w in neighbors {
                    if !dist.contains_key(w.as_str()) {
                        dist.insert(w.as_str(), dist[v] + 1);
                        queue.push_back(w.as_str());
                    }
                }
            }
        }
        let reachable = dist.len() - 1;
        let sum_dist: i64 = dist.values().sum();
        let score = if reachable > 0 && sum_dist > 0 {
            reachable as f64 / sum_dist as f64
        } else {
            0.0
        };
        result.insert(source.clone(), score);
    }
    result
}

/// Eigenvector centrality via power iteration on the (unweighted, undirected
/// treatment of) adjacency, normalized so the max component is 1.0.
pub fn eigenvector_centrality(adjacency: &Adjacency, max_iterations: usize) -> BTreeMap<String, f64> {
    let nodes: Vec<&String> = adjacency.keys().collect();
    let n = nodes.len();
    if n == 0 {
        return BTreeMap::new();
    }

    let mut scores: BTreeMap<String, f64> = nodes.iter().map(|id| ((*id).clone(), 1.0 / n as f64)).collect();

    for _ in 0..max_iterations {
        let mut next: BTreeMap<String, f64> = nodes.iter().map(|id| ((*id).clone(), 0.0)).collect();
        for (from, tos) in adjacency {
            for to in tos {
                *next.get_mut(to).unwrap() += scores[from];
                *next.get_mut(from).unwrap() += scores[to];
            }
        }
        let norm = next.values().cloned().fold(0.0_f64, f64::max);
        if norm > 0.0 {
            for v in next.values_mut() {
                *v /= norm;
            }
        }
        scores = next;
    }

    scores
}
