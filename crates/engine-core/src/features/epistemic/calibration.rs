//! Tracks confidence-vs-outcome calibration (spec §4.J): Expected Calibration
//! Error, Brier score, and trend over a rolling prediction history.

use crate::shared::constants::epistemic::{
    CALIBRATION_BUCKETS, DEFAULT_MIN_PREDICTIONS_FOR_REPORT, TREND_DEGRADING_DELTA, TREND_IMPROVING_DELTA,
};
use crate::shared::models::{CalibrationBucketReport, CalibrationReport, CalibrationTrend};
use chrono::{DateTime, Utc};

struct Prediction {
    confidence: f64,
    outcome: bool,
}

/// Records `(stated confidence, actual outcome)` pairs and produces
/// `CalibrationReport.v1` snapshots. Below `min_predictions`, reports are
/// skeletons rather than computed from too few samples.
pub struct CalibrationTracker {
    predictions: Vec<Prediction>,
    min_predictions: usize,
}

impl CalibrationTracker {
    pub fn new(min_predictions: usize) -> Self {
        Self {
            predictions: Vec::new(),
            min_predictions: min_predictions.max(1),
        }
    }

    pub fn record(&mut self, confidence: f64, outcome: bool) {
        self.predictions.push(Prediction {
            confidence: confidence.clamp(0.0, 1.0),
            outcome,
        });
    }

    pub fn sample_count(&self) -> usize {
        self.predictions.len()
    }

    /// Buckets predictions into `CALIBRATION_BUCKETS` equal-width bins by
    /// stated confidence, reporting per-bucket mean stated confidence,
    /// empirical accuracy, and sample size. Empty buckets are omitted.
    fn buckets(&self) -> Vec<CalibrationBucketReport> {
        let mut bins: Vec<Vec<&Prediction>> = vec![Vec::new(); CALIBRATION_BUCKETS];
        for p in &self.predictions {
            let idx = ((p.confidence * CALIBRATION_BUCKETS as f64) as usize).min(CALIBRATION_BUCKETS - 1);
            bins[idx].push(p);
        }

        bins.into_iter()
            .filter(|b| !b.is_empty())
            .map(|b| {
                let n = b.len() as f64;
                let stated_mean = b.iter().map(|p| p.confidence).sum::<f64>() / n;
                let empirical_accuracy = b.iter().filter(|p| p.outcome).count() as f64 / n;
                CalibrationBucketReport {
                    stated_mean,
                    empirical_accuracy,
                    sample_size: b.len(),
                }
            })
            .collect()
    }

    fn ece(&self, buckets: &[CalibrationBucketReport]) -> f64 {
        let total = self.predictions.len() as f64;
        if total == 0.0 {
            return 0.0;
        }
        buckets
            .iter()
            .map(|b| (b.sample_size as f64 / total) * (b.stated_mean - b.empirical_accuracy).abs())
            .sum()
    }

    fn brier(&self) -> f64 {
        if self.predictions.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .predictions
            .iter()
            .map(|p| {
                let actual = if p.outcome { 1.0 } else { 0.0 };
                (p.confidence - actual).powi(2)
            })
            .sum();
        sum / self.predictions.len() as f64
    }

    /// Compares the mean |stated - empirical| of the newer half of the
    /// history against the older half. `None` when there's too little
    /// history to split meaningfully.
    fn trend(&self) -> Option<CalibrationTrend> {
        if self.predictions.len() < self.min_predictions * 2 {
            return None;
        }
        let mid = self.predictions.len() / 2;
        let (older, newer) = self.predictions.split_at(mid);

        let mean_error = |preds: &[Prediction]| -> f64 {
            preds
                .iter()
                .map(|p| {
                    let actual = if p.outcome { 1.0 } else { 0.0 };
                    (p.confidence - actual).abs()
                })
                .sum::<f64>()
                / preds.len() as f64
        };

        let delta = mean_error(newer) - mean_error(older);
        Some(if delta <= TREND_DEGRADING_DELTA {
            CalibrationTrend::Improving
        } else if delta >= TREND_IMPROVING_DELTA {
            CalibrationTrend::Degrading
        } else {
            CalibrationTrend::Stable
        })
    }

    pub fn report(&self, now: DateTime<Utc>) -> CalibrationReport {
        if self.predictions.len() < self.min_predictions {
            return CalibrationReport::skeleton(now);
        }

        let buckets = self.buckets();
        let overconfident_buckets = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.stated_mean > b.empirical_accuracy)
            .map(|(i, _)| i)
            .collect();
        let underconfident_buckets = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.stated_mean < b.empirical_accuracy)
            .map(|(i, _)| i)
            .collect();

        CalibrationReport {
            kind: CalibrationReport::KIND.to_string(),
            schema_version: 1,
            generated_at: now,
            ece: self.ece(&buckets),
            brier: self.brier(),
            trend: self.trend(),
            buckets,
            overconfident_buckets,
            underconfident_buckets,
        }
    }
}

impl Default for CalibrationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PREDICTIONS_FOR_REPORT)
    }
}
