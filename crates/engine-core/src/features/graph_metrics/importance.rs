//! Unified importance profile: four sub-scores plus a cross-graph-influence
//! term, rolled into flags (spec §4.F).

use crate::config::{ImportanceThresholds, ImportanceWeights};

#[derive(Debug, Clone, Copy, Default)]
pub struct SubScores {
    pub code: f64,
    pub rationale: f64,
    pub epistemic: f64,
    pub org: f64,
    pub cross_graph: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportanceFlags {
    pub is_load_bearing: bool,
    pub is_foundational: bool,
    pub is_at_risk: bool,
    pub needs_validation: bool,
    pub has_truck_factor_risk: bool,
    pub is_hotspot: bool,
}

#[derive(Debug, Clone)]
pub struct ImportanceProfile {
    pub entity_id: String,
    pub score: f64,
    pub sub_scores: SubScores,
    pub flags: ImportanceFlags,
}

/// Weighted rollup of `sub_scores`, clamped to `[0,1]`, plus threshold-derived
/// flags. `confidence` is the entity's epistemic confidence point estimate,
/// which gates `needs_validation` independently of the sub-scores.
pub fn compute_importance_profile(
    entity_id: impl Into<String>,
    sub_scores: SubScores,
    weights: &ImportanceWeights,
    thresholds: &ImportanceThresholds,
    confidence: f64,
) -> ImportanceProfile {
    let score = (weights.code * sub_scores.code
        + weights.rationale * sub_scores.rationale
        + weights.epistemic * sub_scores.epistemic
        + weights.org * sub_scores.org
        + weights.cross_graph * sub_scores.cross_graph)
        .clamp(0.0, 1.0);

    let flags = ImportanceFlags {
        is_load_bearing: score >= thresholds.load_bearing,
        is_foundational: sub_scores.code >= thresholds.foundational,
        is_at_risk: sub_scores.org >= thresholds.at_risk,
        needs_validation: confidence < thresholds.needs_validation,
        has_truck_factor_risk: sub_scores.org >= thresholds.truck_factor,
        is_hotspot: sub_scores.code >= thresholds.hotspot && sub_scores.org >= thresholds.hotspot,
    };

    ImportanceProfile {
        entity_id: entity_id.into(),
        score,
        sub_scores,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_rollup_matches_manual_computation() {
        let weights = ImportanceWeights::default();
        let sub = SubScores {
            code: 0.8,
            rationale: 0.5,
            epistemic: 0.6,
            org: 0.3,
            cross_graph: 0.4,
        };
        let profile = compute_importance_profile("e1", sub, &weights, &ImportanceThresholds::default(), 0.9);
        let expected =
            weights.code * 0.8 + weights.rationale * 0.5 + weights.epistemic * 0.6 + weights.org * 0.3 + weights.cross_graph * 0.4;
        assert!((profile.score - expected).abs() < 1e-9);
    }

    #[test]
    fn score_is_clamped_to_unit_interval() {
        let weights = ImportanceWeights {
            code: 2.0,
            rationale: 0.0,
            epistemic: 0.0,
            org: 0.0,
            cross_graph: 0.0,
        };
        let sub = SubScores {
            code: 1.0,
            ..Default::default()
        };
        let profile = compute_importance_profile("e1", sub, &weights, &ImportanceThresholds::default(), 0.9);
        assert_eq!(profile.score, 1.0);
    }

    #[test]
    fn low_confidence_sets_needs_validation_regardless_of_score() {
        let weights = ImportanceWeights::default();
        let sub = SubScores {
            code: 1.0,
            rationale: 1.0,
            epistemic: 1.0,
            org: 1.0,
            cross_graph: 1.0,
        };
        let profile = compute_importance_profile("e1", sub, &weights, &ImportanceThresholds::default(), 0.1);
        assert!(profile.flags.needs_validation);
    }
}
