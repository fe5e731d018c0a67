//! Measurement & Reports (spec §4.K): retrieval-quality scoring against a
//! judged eval corpus. Calibration reporting lives alongside the epistemic
//! layer it measures (`features::epistemic::CalibrationTracker`); this
//! module owns the other report kind named in §2's component table.

mod quality;

pub use quality::{compute_retrieval_quality_report, QueryJudgment};
