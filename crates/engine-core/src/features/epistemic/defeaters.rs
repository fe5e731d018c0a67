//! Defeaters, contradictions, and support-graph walk (spec §4.J): a claim's
//! foundationality (how much else rests on it) and epistemic load (how much
//! it itself rests on), damped by depth and guarded against cycles.

use super::normalize::normalize_claim_key;
use crate::shared::constants::epistemic::{SUPPORT_GRAPH_DAMPING, SUPPORT_GRAPH_MAX_DEPTH};
use crate::shared::models::ConfidenceValue;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefeaterStatus {
    Pending,
    Active,
    Resolved,
}

/// A defeater reduces confidence in the claims it `targets` while `status`
/// is `Active`; `damping_factor` is how much of the original confidence
/// survives (0 = fully defeated, 1 = no effect).
#[derive(Debug, Clone)]
pub struct Defeater {
    pub targets: Vec<u64>,
    pub status: DefeaterStatus,
    pub damping_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContradictionSeverity {
    Info,
    Warning,
    Blocking,
}

#[derive(Debug, Clone)]
pub struct Contradiction {
    pub claim_a: u64,
    pub claim_b: u64,
    pub severity: ContradictionSeverity,
}

/// The slice of an `EvidenceEntry` that contradiction detection needs:
/// what it asserts (`proposition`) about what (`subject_id`), and with which
/// polarity (`true` = asserts, `false` = negates).
#[derive(Debug, Clone)]
pub struct Claim {
    pub id: u64,
    pub subject_id: String,
    pub proposition: String,
    pub polarity: bool,
    pub confidence: ConfidenceValue,
}

/// Pairs opposing-polarity claims about the same (normalized) subject and
/// proposition into `Contradiction`s (spec §4.J, invariant §8.10).
/// `normalize_claim_key` NFC-normalizes, trims, and lowercases both fields
/// first, so `café`/`cafe´` and stray whitespace/case differences unify
/// before comparison.
///
/// Severity scales with how confident both claims are: two high-confidence
/// claims contradicting each other is `blocking`; a high- vs. low-confidence
/// pair is `warning`; two low-confidence claims are `info`.
pub fn detect_contradictions(claims: &[Claim]) -> Vec<Contradiction> {
    const HIGH_CONFIDENCE: f64 = 0.8;

    let keyed: Vec<(u64, bool, String, String, f64)> = claims
        .iter()
        .map(|c| {
            (
                c.id,
                c.polarity,
                normalize_claim_key(&c.subject_id),
                normalize_claim_key(&c.proposition),
                c.confidence.point_estimate(),
            )
        })
        .collect();

    let mut contradictions = Vec::new();
    for i in 0..keyed.len() {
        for j in (i + 1)..keyed.len() {
            let (id_a, polarity_a, subject_a, prop_a, conf_a) = &keyed[i];
            let (id_b, polarity_b, subject_b, prop_b, conf_b) = &keyed[j];

            if polarity_a == polarity_b || subject_a != subject_b || prop_a != prop_b {
                continue;
            }

            let high_count = [conf_a, conf_b].iter().filter(|c| ***c >= HIGH_CONFIDENCE).count();
            let severity = match high_count {
                2 => ContradictionSeverity::Blocking,
                1 => ContradictionSeverity::Warning,
                _ => ContradictionSeverity::Info,
            };

            contradictions.push(Contradiction {
                claim_a: *id_a,
                claim_b: *id_b,
                severity,
            });
        }
    }
    contradictions
}

/// Applies every `Active` defeater's `damping_factor` to its targets'
/// confidence (spec §4.J). `Pending`/`Resolved` defeaters are inert.
/// Multiple active defeaters on the same claim compound multiplicatively.
pub fn apply_defeaters(confidences: &BTreeMap<u64, f64>, defeaters: &[Defeater]) -> BTreeMap<u64, f64> {
    let mut damped = confidences.clone();
    for defeater in defeaters {
        if defeater.status != DefeaterStatus::Active {
            continue;
        }
        for target in &defeater.targets {
            if let Some(value) = damped.get_mut(target) {
                *value *= defeater.damping_factor;
            }
        }
    }
    damped
}

#[derive(Debug, Clone, Default)]
pub struct SupportGraphMetrics {
    /// claim id -> how many other claims (directly or transitively, damped)
    /// depend on it holding.
    pub foundationality: BTreeMap<u64, f64>,
    /// claim id -> how much it itself rests on other claims.
    pub epistemic_load: BTreeMap<u64, f64>,
}

/// `support` maps a claim to the claims it is directly supported by (an edge
/// `a -> b` means "a depends on b"). Walks every claim to depth
/// `SUPPORT_GRAPH_MAX_DEPTH`, damping contribution by `SUPPORT_GRAPH_DAMPING`
/// per hop and guarding against cycles with a per-walk visited set.
pub fn walk_support_graph(support: &BTreeMap<u64, Vec<u64>>) -> SupportGraphMetrics {
    let mut reverse: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for (claim, deps) in support {
        for dep in deps {
            reverse.entry(*dep).or_default().push(*claim);
        }
    }

    let mut metrics = SupportGraphMetrics::default();
    let all_claims: HashSet<u64> = support.keys().copied().chain(support.values().flatten().copied()).collect();

    for &claim in &all_claims {
        metrics.epistemic_load.insert(claim, damped_reach(&claim, support, &mut HashSet::new(), 0));
        metrics.foundationality.insert(claim, damped_reach(&claim, &reverse, &mut HashSet::new(), 0));
    }

    metrics
}

fn damped_reach(claim: &u64, edges: &BTreeMap<u64, Vec<u64>>, visited: &mut HashSet<u64>, depth: usize) -> f64 {
    if depth >= SUPPORT_GRAPH_MAX_DEPTH || !visited.insert(*claim) {
        return 0.0;
    }

    let total = match edges.get(claim) {
        Some(neighbors) => {
            let weight = SUPPORT_GRAPH_DAMPING.powi(depth as i32 + 1);
            neighbors.iter().map(|n| weight + damped_reach(n, edges, visited, depth + 1)).sum()
        }
        None => 0.0,
    };

    visited.remove(claim);
    total
}
