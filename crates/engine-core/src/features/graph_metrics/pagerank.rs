//! PageRank with dangling-node redistribution (spec §4.F).

use super::Adjacency;
use std::collections::BTreeMap;

/// Classic PageRank: damping `d`, up to `max_iterations`, stopping once the
/// max per-node delta drops below `convergence`. Dangling nodes (no outgoing
/// edges) redistribute their mass uniformly across every node, per
/// iteration, rather than leaking it.
pub fn pagerank(adjacency: &Adjacency, damping: f64, max_iterations: usize, convergence: f64) -> BTreeMap<String, f64> {
    let n = adjacency.len();
    if n == 0 {
        return BTreeMap::new();
    }

    let base = (1.0 - damping) / n as f64;
    let mut incoming: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (from, tos) in adjacency {
        for to in tos {
            incoming.entry(to.as_str()).or_default().push(from.as_str());
        }
    }

    let mut scores: BTreeMap<String, f64> = adjacency.keys().map(|k| (k.clone(), 1.0 / n as f64)).collect();

    for _ in 0..max_iterations {
        let dangling_mass: f64 = adjacency
            .iter()
            .filter(|(_, tos)| tos.is_empty())
            .map(|(id, _)| scores[id])
            .sum();
        let dangling_share = damping * dangling_mass / n as f64;

        let mut next = BTreeMap::new();
        let mut max_delta: f64 = 0.0;
        for node in adjacency.keys() {
            let inbound_sum: f64 = incoming
                .get(node.as_str())
                .map(|froms| {
                    froms
                        .iter()
                        .map(|from| {
                            let out_degree = adjacency[*from].len().max(1);
                            scores[*from] / out_degree as f64
                        })
                        .sum()
                })
                .unwrap_or(0.0);

            let score = base + dangling_share + damping * inbound_sum;
            max_delta = max_delta.max((score - scores[node]).abs());
            next.insert(node.clone(), score);
        }
        scores = next;
        if max_delta < convergence {
            break;
        }
    }

    scores
}
