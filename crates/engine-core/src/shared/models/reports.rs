//! Versioned report artifacts (spec §3, §6): `RetrievalQualityReport.v1` and
//! `CalibrationReport.v1`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationBucketReport {
    pub stated_mean: f64,
    pub empirical_accuracy: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub kind: String,
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub buckets: Vec<CalibrationBucketReport>,
    pub ece: f64,
    pub brier: f64,
    pub overconfident_buckets: Vec<usize>,
    pub underconfident_buckets: Vec<usize>,
    pub trend: Option<CalibrationTrend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationTrend {
    Improving,
    Degrading,
    Stable,
}

impl CalibrationReport {
    pub const KIND: &'static str = "CalibrationReport.v1";

    /// A skeleton report (zero buckets) emitted when the minimum prediction
    /// count gate has not been met.
    pub fn skeleton(generated_at: DateTime<Utc>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            schema_version: 1,
            generated_at,
            buckets: Vec::new(),
            ece: 0.0,
            brier: 0.0,
            overconfident_buckets: Vec::new(),
            underconfident_buckets: Vec::new(),
            trend: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerQueryMetric {
    pub query_id: String,
    pub recall_at_5: f64,
    pub ndcg_at_5: f64,
    pub reciprocal_rank: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalQualityReport {
    pub kind: String,
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub aggregate_recall_at_5: f64,
    pub aggregate_ndcg_at_5: f64,
    pub aggregate_mrr: f64,
    pub per_query: Vec<PerQueryMetric>,
    pub recall_at_5_target_met: bool,
    pub ndcg_at_5_target_met: bool,
    pub mrr_target_met: bool,
    pub trend: Option<RetrievalTrend>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalTrend {
    pub recall_at_5_delta: f64,
    pub ndcg_at_5_delta: f64,
    pub mrr_delta: f64,
}

impl RetrievalQualityReport {
    pub const KIND: &'static str = "RetrievalQualityReport.v1";
}
