//! The `Storage` port (spec §4.B): typed operations over the durable
//! store's tables. No raw SQL crosses this boundary — callers get and put
//! `engine_core` domain types only.

mod conflict;

pub use conflict::{with_optimistic_retry, ConflictResolution};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine_core::models::{
    CacheEntry, CalibrationReport, ContextPack, Edge, EvidenceEntry, EvidenceKind, FileEntity, FunctionEntity,
    ModuleEntity, MultiVector,
};
use uuid::Uuid;

use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub success: bool,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn upsert_file(&self, file: &FileEntity) -> Result<()>;
    async fn get_file(&self, path: &str) -> Result<Option<FileEntity>>;

    async fn upsert_function(&self, function: &FunctionEntity) -> Result<()>;
    async fn get_function(&self, id: &str) -> Result<Option<FunctionEntity>>;

    async fn upsert_module(&self, module: &ModuleEntity) -> Result<()>;
    async fn get_module(&self, id: &str) -> Result<Option<ModuleEntity>>;

    /// Validates that both `edge.from_id` and `edge.to_id` already exist in
    /// their respective entity tables before inserting (spec §4.B schema
    /// guarantee); fails with `DanglingEdgeEndpoint` otherwise.
    async fn insert_edge(&self, edge: &Edge) -> Result<()>;
    async fn get_edges_from(&self, entity_id: &str) -> Result<Vec<Edge>>;

    /// Upserts a pack, bumping `pack.version`; returns `TransactionConflict`
    /// if the stored version has moved since the caller last read it.
    async fn upsert_context_pack(&self, pack: &ContextPack, expected_version: Option<u32>) -> Result<()>;
    async fn get_context_pack(&self, pack_id: Uuid) -> Result<Option<ContextPack>>;

    async fn upsert_embedding(&self, vector: &MultiVector) -> Result<()>;
    async fn get_embedding(&self, file_path: &str) -> Result<Option<MultiVector>>;

    async fn cache_set(&self, entry: &CacheEntry<serde_json::Value>) -> Result<()>;
    async fn cache_get(&self, content_hash: &str, analysis_version: &str) -> Result<Option<CacheEntry<serde_json::Value>>>;
    async fn cache_invalidate_by_version(&self, stale_version: &str) -> Result<u64>;

    /// Appends one entry to the evidence ledger. The caller supplies the id
    /// (via `features::epistemic::evidence::append_entry`); this only
    /// enforces append-only (rejects reused ids).
    async fn append_evidence(&self, entry: &EvidenceEntry) -> Result<()>;
    async fn query_evidence(&self, kinds: &[EvidenceKind], time_range: Option<TimeRange>, limit: usize) -> Result<Vec<EvidenceEntry>>;

    async fn record_outcome(&self, pack_id: Uuid, success: bool, recorded_at: DateTime<Utc>) -> Result<()>;
    async fn get_outcomes(&self, pack_id: Uuid) -> Result<Vec<PackOutcome>>;

    async fn save_calibration_report(&self, report: &CalibrationReport) -> Result<()>;
    async fn get_latest_calibration_report(&self) -> Result<Option<CalibrationReport>>;
}
