//! engine-pipeline — the indexing and query orchestrators built on top of
//! `engine-core`'s pure functions and `engine-storage`'s durable store.
//!
//! `indexing` runs the eight-phase pipeline (spec §4.D) over a job and a
//! file list; `query` runs the four-stage retrieval pipeline (spec §4.H)
//! over a candidate set, with `session` enforcing the session concurrency
//! contract and `guidance` attaching scenario checklists to the result.

pub mod checkpoint;
pub mod concurrency;
pub mod dag;
pub mod error;
pub mod guidance;
pub mod indexing;
pub mod job;
pub mod query;
pub mod session;
pub mod stage_tracker;

pub use checkpoint::CheckpointManager;
pub use concurrency::run_concurrent;
pub use dag::{CacheKeyManager, PipelineDAG, StageNode};
pub use error::{ErrorCategory, PipelineError, Result};
pub use guidance::{build_guidance, GuidanceReport, Scenario};
pub use indexing::{IndexingPipeline, PhaseReport};
pub use job::{Job, JobState, JobStateMachine, StageId};
pub use query::{PackCandidate, QueryPipeline, QueryResult};
pub use session::SessionManager;
pub use stage_tracker::{StageReport, StageStatus, StageTracker, STAGES};
