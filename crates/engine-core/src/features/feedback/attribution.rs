//! `attributeFailure` (spec §4.I): decides whether a failed task was caused
//! by bad context (a "knowledge" failure) versus something else, and ranks
//! candidate packs by Ochiai spectrum-based fault localization.

use crate::shared::constants::feedback::{KNOWLEDGE_CAUSED_THRESHOLD, MIN_SAMPLES, NEUTRAL_SCORE, SUSPICIOUS_THRESHOLD};
use uuid::Uuid;

/// Failure reasons that never implicate the context packs themselves.
const NON_KNOWLEDGE_TOKENS: &[&str] = &["timeout", "provider_error", "rate_limit", "network_error", "cancelled"];

/// Failure reasons that directly implicate stale or wrong context.
const KNOWLEDGE_FAILURE_HINT_TOKENS: &[&str] = &["stale_context", "wrong_file", "outdated_pack", "hallucinated_api"];

#[derive(Debug, Clone)]
pub struct Outcome {
    pub success: bool,
    pub failure_reason: Option<String>,
}

/// A candidate pack's track record, used as one "spectrum" in Ochiai
/// scoring: how often it was present in failing vs. passing runs.
#[derive(Debug, Clone)]
pub struct PackStats {
    pub pack_id: Uuid,
    pub failed_with: u32,
    pub passed_with: u32,
}

impl PackStats {
    fn sample_count(&self) -> u32 {
        self.failed_with + self.passed_with
    }

    /// Ochiai score: `fail_p / sqrt(total_failures * (fail_p + succ_p))`.
    /// Neutral `0.5` below `MIN_SAMPLES` observations; `0.0` when there are
    /// no failures anywhere in the corpus.
    fn ochiai(&self, total_failures: u32) -> f64 {
        if self.sample_count() < MIN_SAMPLES {
            return NEUTRAL_SCORE;
        }
        if total_failures == 0 {
            return 0.0;
        }
        let fail_p = self.failed_with as f64;
        let succ_p = self.passed_with as f64;
        fail_p / (total_failures as f64 * (fail_p + succ_p)).sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct CausalAttribution {
    pub knowledge_caused: bool,
    pub confidence: f64,
    pub suspicious_packs: Vec<Uuid>,
    pub recommended_for_reindex: Option<Uuid>,
    pub recommendation: String,
}

fn contains_token(reason: &Option<String>, tokens: &[&str]) -> bool {
    match reason {
        Some(r) => {
            let lower = r.to_lowercase();
            tokens.iter().any(|t| lower.contains(t))
        }
        None => false,
    }
}

/// `candidates` are the packs involved in the failing/passing run being
/// attributed; `total_failures` is the global failure count across the
/// whole corpus (the Ochiai denominator).
pub fn attribute_failure(outcome: &Outcome, candidates: &[PackStats], total_failures: u32) -> CausalAttribution {
    if outcome.success {
        return CausalAttribution {
            knowledge_caused: false,
            confidence: 0.2,
            suspicious_packs: Vec::new(),
            recommended_for_reindex: None,
            recommendation: "task succeeded; no attribution needed".to_string(),
        };
    }

    if contains_token(&outcome.failure_reason, NON_KNOWLEDGE_TOKENS) {
        return CausalAttribution {
            knowledge_caused: false,
            confidence: 0.6,
            suspicious_packs: Vec::new(),
            recommended_for_reindex: None,
            recommendation: "failure reason matches a non-knowledge cause".to_string(),
        };
    }

    let mut scored: Vec<(Uuid, f64)> = candidates.iter().map(|c| (c.pack_id, c.ochiai(total_failures))).collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let top = scored.first().copied();
    let hint_present = contains_token(&outcome.failure_reason, KNOWLEDGE_FAILURE_HINT_TOKENS);
    let top_score = top.map(|(_, s)| s).unwrap_or(0.0);
    let knowledge_caused = hint_present || top_score > KNOWLEDGE_CAUSED_THRESHOLD;

    let suspicious_packs: Vec<Uuid> = scored.iter().filter(|(_, s)| *s > SUSPICIOUS_THRESHOLD).map(|(id, _)| *id).collect();

    CausalAttribution {
        knowledge_caused,
        confidence: top_score,
        suspicious_packs,
        recommended_for_reindex: top.map(|(id, _)| id),
        recommendation: if knowledge_caused {
            "top-scoring pack recommended for re-indexing".to_string()
        } else {
            "no pack scored high enough to implicate context".to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, reason: Option<&str>) -> Outcome {
        Outcome { success, failure_reason: reason.map(|s| s.to_string()) }
    }

    #[test]
    fn success_returns_low_confidence_non_knowledge() {
        let result = attribute_failure(&outcome(true, None), &[], 0);
        assert!(!result.knowledge_caused);
        assert_eq!(result.confidence, 0.2);
    }

    #[test]
    fn non_knowledge_token_short_circuits_to_non_knowledge() {
        let result = attribute_failure(&outcome(false, Some("provider_error: upstream 503")), &[], 5);
        assert!(!result.knowledge_caused);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn insufficient_samples_get_neutral_score() {
        let candidates = vec![PackStats { pack_id: Uuid::new_v4(), failed_with: 1, passed_with: 0 }];
        let result = attribute_failure(&outcome(false, Some("wrong output")), &candidates, 4);
        assert_eq!(result.confidence, NEUTRAL_SCORE);
    }

    #[test]
    fn hint_token_forces_knowledge_caused_regardless_of_score() {
        let candidates = vec![PackStats { pack_id: Uuid::new_v4(), failed_with: 1, passed_with: 1 }];
        let result = attribute_failure(&outcome(false, Some("stale_context detected")), &candidates, 4);
        assert!(result.knowledge_caused);
    }

    #[test]
    fn high_ochiai_score_marks_pack_suspicious_and_recommended() {
        let target = Uuid::new_v4();
        let other = Uuid::new_v4();
        let candidates = vec![
            PackStats { pack_id: target, failed_with: 8, passed_with: 0 },
            PackStats { pack_id: other, failed_with: 1, passed_with: 9 },
        ];
        let result = attribute_failure(&outcome(false, Some("assertion failed")), &candidates, 10);
        assert_eq!(result.recommended_for_reindex, Some(target));
        assert!(result.suspicious_packs.contains(&target));
    }

    #[test]
    fn zero_global_failures_scores_zero() {
        let candidates = vec![PackStats { pack_id: Uuid::new_v4(), failed_with: 4, passed_with: 4 }];
        let result = attribute_failure(&outcome(false, Some("assertion failed")), &candidates, 0);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.knowledge_caused);
    }
}
