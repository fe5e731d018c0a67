//! `ConfidenceValue`: a sum type that carries its own provenance (spec §3).
//! Combinators (Bayesian update, conjunction, weighted aggregation) live in
//! `features::epistemic::algebra`, not here — this module is the shape only.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundedKind {
    Theoretical,
    Empirical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfidenceValue {
    /// `value` is exactly 0.0 or 1.0, established by a source that cannot be
    /// wrong absent a bug (e.g. "this edge exists because we just inserted
    /// it").
    Deterministic { value: f64, source: String },

    /// A range `[low, high]` with `0 <= low <= high <= 1`, annotated with
    /// whether the bound is theoretical or empirically observed.
    Bounded {
        low: f64,
        high: f64,
        kind: BoundedKind,
        rationale: String,
    },

    /// A single aggregated value in `[0,1]` with the inputs that produced it
    /// (Bayesian update or weighted combination).
    Derived { value: f64, inputs: Vec<String> },

    /// No confidence statement can be made; `reason` is required.
    Absent { reason: String },
}

impl ConfidenceValue {
    /// A representative point estimate, used where callers need a single
    /// number (pack ranking base score, calibration bucketing). `Bounded`
    /// collapses to its midpoint; `Absent` collapses to 0.0.
    pub fn point_estimate(&self) -> f64 {
        match self {
            ConfidenceValue::Deterministic { value, .. } => *value,
            ConfidenceValue::Bounded { low, high, .. } => (low + high) / 2.0,
            ConfidenceValue::Derived { value, .. } => *value,
            ConfidenceValue::Absent { .. } => 0.0,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ConfidenceValue::Absent { .. })
    }

    pub fn deterministic_true(source: impl Into<String>) -> Self {
        ConfidenceValue::Deterministic {
            value: 1.0,
            source: source.into(),
        }
    }

    pub fn deterministic_false(source: impl Into<String>) -> Self {
        ConfidenceValue::Deterministic {
            value: 0.0,
            source: source.into(),
        }
    }

    pub fn absent(reason: impl Into<String>) -> Self {
        ConfidenceValue::Absent {
            reason: reason.into(),
        }
    }
}
