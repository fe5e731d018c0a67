//! Indexing job state machine (spec §4.D phases, in order).

use crate::error::{ErrorCategory, PipelineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the eight ordered indexing phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    StructuralScan,
    SymbolExtraction,
    RelationshipDiscovery,
    EmbeddingGeneration,
    Summarization,
    ContextPackGeneration,
    CalibrationSeed,
    Verification,
}

impl StageId {
    pub const ORDER: [StageId; 8] = [
        StageId::StructuralScan,
        StageId::SymbolExtraction,
        StageId::RelationshipDiscovery,
        StageId::EmbeddingGeneration,
        StageId::Summarization,
        StageId::ContextPackGeneration,
        StageId::CalibrationSeed,
        StageId::Verification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::StructuralScan => "structural_scan",
            StageId::SymbolExtraction => "symbol_extraction",
            StageId::RelationshipDiscovery => "relationship_discovery",
            StageId::EmbeddingGeneration => "embedding_generation",
            StageId::Summarization => "summarization",
            StageId::ContextPackGeneration => "context_pack_generation",
            StageId::CalibrationSeed => "calibration_seed",
            StageId::Verification => "verification",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "structural_scan" => Ok(StageId::StructuralScan),
            "symbol_extraction" => Ok(StageId::SymbolExtraction),
            "relationship_discovery" => Ok(StageId::RelationshipDiscovery),
            "embedding_generation" => Ok(StageId::EmbeddingGeneration),
            "summarization" => Ok(StageId::Summarization),
            "context_pack_generation" => Ok(StageId::ContextPackGeneration),
            "calibration_seed" => Ok(StageId::CalibrationSeed),
            "verification" => Ok(StageId::Verification),
            other => Err(PipelineError::parse(format!("invalid stage id: {other}"))),
        }
    }

    /// The stage that immediately precedes this one in the fixed phase
    /// order, or `None` for the first phase.
    pub fn previous(&self) -> Option<StageId> {
        let idx = Self::ORDER.iter().position(|s| s == self)?;
        idx.checked_sub(1).map(|i| Self::ORDER[i])
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job lifecycle state. Every transition is timestamped; `Failed` records
/// enough to decide whether and when a retry is worth attempting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobState {
    Queued {
        queued_at: DateTime<Utc>,
        priority: i32,
    },
    Running {
        started_at: DateTime<Utc>,
        worker_id: String,
        current_stage: StageId,
    },
    Completed {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        duration_ms: u64,
        files_processed: usize,
    },
    Failed {
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
        error: String,
        error_category: ErrorCategory,
        failed_stage: StageId,
        retry_count: u32,
        next_retry_at: Option<DateTime<Utc>>,
    },
    Cancelled {
        cancelled_at: DateTime<Utc>,
        reason: String,
    },
}

impl JobState {
    pub fn state_name(&self) -> &'static str {
        match self {
            JobState::Queued { .. } => "queued",
            JobState::Running { .. } => "running",
            JobState::Completed { .. } => "completed",
            JobState::Failed { .. } => "failed",
            JobState::Cancelled { .. } => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. } | JobState::Cancelled { .. })
    }
}

/// A single indexing run over one workspace.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub workspace_root: String,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new_queued(workspace_root: impl Into<String>, priority: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_root: workspace_root.into(),
            state: JobState::Queued { queued_at: now, priority },
            created_at: now,
            updated_at: now,
        }
    }
}

/// Enforces valid `JobState` transitions; every method either mutates the
/// wrapped job or returns `InvalidStateTransition`.
pub struct JobStateMachine {
    job: Job,
}

impl JobStateMachine {
    pub fn new(job: Job) -> Self {
        Self { job }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    fn invalid_transition(&self, to: &str) -> PipelineError {
        PipelineError::InvalidStateTransition {
            from: self.job.state.state_name().to_string(),
            to: to.to_string(),
        }
    }

    pub fn start(&mut self, worker_id: String, current_stage: StageId, now: DateTime<Utc>) -> Result<()> {
        match &self.job.state {
            JobState::Queued { .. } => {
                self.job.state = JobState::Running {
                    started_at: now,
                    worker_id,
                    current_stage,
                };
                self.job.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_transition("running")),
        }
    }

    pub fn complete(&mut self, files_processed: usize, now: DateTime<Utc>) -> Result<()> {
        match &self.job.state {
            JobState::Running { started_at, .. } => {
                let duration_ms = (now - *started_at).num_milliseconds().max(0) as u64;
                self.job.state = JobState::Completed {
                    started_at: *started_at,
                    completed_at: now,
                    duration_ms,
                    files_processed,
                };
                self.job.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_transition("completed")),
        }
    }

    /// Exponential backoff capped at three attempts: `2^retry_count`
    /// seconds, only for `Transient` errors.
    pub fn fail(&mut self, error: String, error_category: ErrorCategory, failed_stage: StageId, retry_count: u32, now: DateTime<Utc>) -> Result<()> {
        match &self.job.state {
            JobState::Running { started_at, .. } | JobState::Failed { started_at, .. } => {
                let next_retry_at = if retry_count < 3 && error_category == ErrorCategory::Transient {
                    let backoff_secs = 2u64.pow(retry_count);
                    Some(now + chrono::Duration::seconds(backoff_secs as i64))
                } else {
                    None
                };

                self.job.state = JobState::Failed {
                    started_at: *started_at,
                    failed_at: now,
                    error,
                    error_category,
                    failed_stage,
                    retry_count,
                    next_retry_at,
                };
                self.job.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_transition("failed")),
        }
    }

    pub fn retry(&mut self, now: DateTime<Utc>) -> Result<()> {
        match &self.job.state {
            JobState::Failed { retry_count, next_retry_at, .. } => {
                if next_retry_at.is_none() {
                    return Err(PipelineError::config("no retry scheduled: max retries exceeded"));
                }
                self.job.state = JobState::Queued {
                    queued_at: now,
                    priority: *retry_count as i32,
                };
                self.job.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_transition("queued (retry)")),
        }
    }

    pub fn cancel(&mut self, reason: String, now: DateTime<Utc>) -> Result<()> {
        if self.job.state.is_terminal() {
            return Err(self.invalid_transition("cancelled"));
        }
        self.job.state = JobState::Cancelled { cancelled_at: now, reason };
        self.job.updated_at = now;
        Ok(())
    }

    pub fn update_stage(&mut self, stage: StageId, now: DateTime<Utc>) -> Result<()> {
        match &mut self.job.state {
            JobState::Running { current_stage, .. } => {
                *current_stage = stage;
                self.job.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_transition("update_stage")),
        }
    }
}
