//! Retrieval-quality measurement (spec §2-G, §4.K): Recall@5, nDCG@5, and
//! MRR computed over per-query judgments from a held-out eval corpus, rolled
//! into a `RetrievalQualityReport.v1` with target-compliance flags and a
//! trend diff against a prior report.

use crate::config::QualityTargets;
use crate::shared::constants::targets::K;
use crate::shared::models::{PerQueryMetric, RetrievalQualityReport, RetrievalTrend};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// One query's ranked results (best first) paired with the ids a judge
/// marked relevant to it.
#[derive(Debug, Clone)]
pub struct QueryJudgment {
    pub query_id: String,
    pub ranked_ids: Vec<String>,
    pub relevant_ids: HashSet<String>,
}

fn recall_at_k(ranked: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = ranked.iter().take(k).filter(|id| relevant.contains(*id)).count();
    hits as f64 / relevant.len() as f64
}

fn dcg_at_k(ranked: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    ranked
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, id)| relevant.contains(*id))
        .map(|(i, _)| 1.0 / (i as f64 + 2.0).log2())
        .sum()
}

/// Binary-relevance nDCG: the ideal ranking puts every relevant id (up to
/// `k` of them) first, so `idealDcg` is a closed form, not a second sort.
fn ndcg_at_k(ranked: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    let ideal_hits = relevant.len().min(k);
    if ideal_hits == 0 {
        return 0.0;
    }
    let ideal_dcg: f64 = (0..ideal_hits).map(|i| 1.0 / (i as f64 + 2.0).log2()).sum();
    (dcg_at_k(ranked, relevant, k) / ideal_dcg).clamp(0.0, 1.0)
}

fn reciprocal_rank(ranked: &[String], relevant: &HashSet<String>) -> f64 {
    ranked
        .iter()
        .position(|id| relevant.contains(id))
        .map(|idx| 1.0 / (idx as f64 + 1.0))
        .unwrap_or(0.0)
}

fn per_query_metric(judgment: &QueryJudgment) -> PerQueryMetric {
    PerQueryMetric {
        query_id: judgment.query_id.clone(),
        recall_at_5: recall_at_k(&judgment.ranked_ids, &judgment.relevant_ids, K),
        ndcg_at_5: ndcg_at_k(&judgment.ranked_ids, &judgment.relevant_ids, K),
        reciprocal_rank: reciprocal_rank(&judgment.ranked_ids, &judgment.relevant_ids),
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Builds a `RetrievalQualityReport.v1` from per-query judgments, checking
/// each aggregate against `targets`'s pass/fail thresholds and diffing
/// against `prior` when one is supplied.
pub fn compute_retrieval_quality_report(
    judgments: &[QueryJudgment],
    targets: &QualityTargets,
    prior: Option<&RetrievalQualityReport>,
    generated_at: DateTime<Utc>,
) -> RetrievalQualityReport {
    let per_query: Vec<PerQueryMetric> = judgments.iter().map(per_query_metric).collect();
    let n = per_query.len();

    let aggregate_recall_at_5 = mean(per_query.iter().map(|m| m.recall_at_5), n);
    let aggregate_ndcg_at_5 = mean(per_query.iter().map(|m| m.ndcg_at_5), n);
    let aggregate_mrr = mean(per_query.iter().map(|m| m.reciprocal_rank), n);

    let trend = prior.map(|p| RetrievalTrend {
        recall_at_5_delta: aggregate_recall_at_5 - p.aggregate_recall_at_5,
        ndcg_at_5_delta: aggregate_ndcg_at_5 - p.aggregate_ndcg_at_5,
        mrr_delta: aggregate_mrr - p.aggregate_mrr,
    });

    RetrievalQualityReport {
        kind: RetrievalQualityReport::KIND.to_string(),
        schema_version: 1,
        generated_at,
        aggregate_recall_at_5,
        aggregate_ndcg_at_5,
        aggregate_mrr,
        per_query,
        recall_at_5_target_met: aggregate_recall_at_5 >= targets.recall_at_5,
        ndcg_at_5_target_met: aggregate_ndcg_at_5 >= targets.ndcg_at_5,
        mrr_target_met: aggregate_mrr >= targets.mrr,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    fn judgment(query_id: &str, ranked: &[&str], relevant: &[&str]) -> QueryJudgment {
        QueryJudgment {
            query_id: query_id.to_string(),
            ranked_ids: ranked.iter().map(|s| s.to_string()).collect(),
            relevant_ids: relevant.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn recall_counts_only_hits_within_the_cutoff() {
        let ranked = vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into(), "f".into()];
        let relevant: HashSet<String> = ["a".into(), "f".into()].into_iter().collect();
        assert_eq!(recall_at_k(&ranked, &relevant, 5), 0.5);
    }

    #[test]
    fn ndcg_rewards_an_earlier_hit_over_a_later_one() {
        let relevant: HashSet<String> = ["x".into()].into_iter().collect();
        let early = vec!["x".into(), "y".into()];
        let late = vec!["y".into(), "x".into()];
        assert!(ndcg_at_k(&early, &relevant, 5) > ndcg_at_k(&late, &relevant, 5));
    }

    #[test]
    fn ndcg_is_one_when_every_relevant_id_leads() {
        let relevant: HashSet<String> = ["a".into(), "b".into()].into_iter().collect();
        let ranked = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(ndcg_at_k(&ranked, &relevant, 5), 1.0);
    }

    #[test]
    fn reciprocal_rank_is_zero_when_nothing_relevant_is_retrieved() {
        let relevant: HashSet<String> = ["z".into()].into_iter().collect();
        let ranked = vec!["a".into(), "b".into()];
        assert_eq!(reciprocal_rank(&ranked, &relevant), 0.0);
    }

    #[test]
    fn reciprocal_rank_of_second_place_hit_is_one_half() {
        let relevant: HashSet<String> = ["b".into()].into_iter().collect();
        let ranked = vec!["a".into(), "b".into()];
        assert_eq!(reciprocal_rank(&ranked, &relevant), 0.5);
    }

    #[test]
    fn empty_judgments_yield_zero_aggregates_without_panicking() {
        let report = compute_retrieval_quality_report(&[], &QualityTargets::default(), None, now());
        assert_eq!(report.aggregate_recall_at_5, 0.0);
        assert!(!report.recall_at_5_target_met);
        assert!(report.per_query.is_empty());
    }

    #[test]
    fn perfect_retrieval_clears_all_three_targets() {
        let judgments = vec![
            judgment("q1", &["a", "b"], &["a"]),
            judgment("q2", &["c", "d"], &["c"]),
        ];
        let report = compute_retrieval_quality_report(&judgments, &QualityTargets::default(), None, now());
        assert!(report.recall_at_5_target_met);
        assert!(report.ndcg_at_5_target_met);
        assert!(report.mrr_target_met);
        assert_eq!(report.aggregate_mrr, 1.0);
    }

    #[test]
    fn trend_reports_deltas_against_a_prior_report() {
        let weak = vec![judgment("q1", &["b", "a"], &["a"])];
        let prior = compute_retrieval_quality_report(&weak, &QualityTargets::default(), None, now());

        let strong = vec![judgment("q1", &["a", "b"], &["a"])];
        let report = compute_retrieval_quality_report(&strong, &QualityTargets::default(), Some(&prior), now());

        let trend = report.trend.expect("prior report supplied");
        assert!(trend.mrr_delta > 0.0);
        assert!(trend.ndcg_at_5_delta > 0.0);
    }
}
