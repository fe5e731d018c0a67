//! Core data model (spec §3): immutable records identified by stable ids.
//! Mutation only happens by inserting new versions or updating the explicit
//! mutable counters named below (`access_count`, `success_count`,
//! `failure_count`, `last_accessed`).

mod confidence;
mod entities;
mod pack;
mod reports;
mod vectors;

pub use confidence::ConfidenceValue;
pub use entities::{Durability, Edge, EdgeType, FileCategory, FileEntity, FunctionEntity, ModuleEntity};
pub use pack::{ContextPack, LastOutcome, PackType, Session};
pub use reports::{
    CalibrationBucketReport, CalibrationReport, CalibrationTrend, PerQueryMetric, RetrievalQualityReport, RetrievalTrend,
};
pub use vectors::{Aspect, MultiVector};

use serde::{Deserialize, Serialize};

/// Entity identifier. Stable across re-indexing for the same logical entity.
pub type EntityId = String;

/// A content-addressed cache entry, keyed by `(content_hash, analysis_version)`
/// (invariant §3.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub content_hash: String,
    pub analysis_version: String,
    pub result: T,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub access_count: u64,
    pub last_accessed: chrono::DateTime<chrono::Utc>,
    pub size_bytes: u64,
}

/// Append-only evidence ledger entry (spec §3, invariant §3.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub id: u64,
    pub kind: EvidenceKind,
    pub payload: serde_json::Value,
    pub provenance: Provenance,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub related_entries: Vec<u64>,
    pub confidence: ConfidenceValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Claim,
    Outcome,
    Calibration,
    Contradiction,
    Defeater,
    Observation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub method: String,
}
