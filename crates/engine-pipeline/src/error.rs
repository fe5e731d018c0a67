//! Error types for the indexing and query pipelines.
//!
//! `PipelineError::code()` exposes the same stable error-code vocabulary as
//! `engine_core::CoreError::code()`; callers that only care about the wire
//! code don't need to match on which crate actually raised it.

use engine_core::CoreError;
use engine_storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("stage not found: {0}")]
    StageNotFound(String),

    #[error("checkpoint not found for job {job_id} stage {stage}")]
    CheckpointNotFound { job_id: String, stage: String },

    #[error("dependency cycle detected in pipeline DAG")]
    DagCycleDetected,

    #[error("missing dependency: stage {stage} depends on unknown stage {depends_on}")]
    MissingDependency { stage: String, depends_on: String },

    #[error("stage {stage} failed: {message}")]
    StageExecutionFailed { stage: String, message: String },

    #[error("operation timed out after {0}ms")]
    Timeout(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn parse<E: std::fmt::Display>(e: E) -> Self {
        Self::Parse(e.to_string())
    }

    pub fn config<E: std::fmt::Display>(e: E) -> Self {
        Self::Config(e.to_string())
    }

    /// Stable error code. Delegates to the wrapped error where one already
    /// carries the spec's vocabulary (`provider_unavailable`,
    /// `budget_exhausted`, `context_session_*`, `transaction_conflict`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Core(e) => e.code(),
            PipelineError::Storage(StorageError::TransactionConflict { .. }) => "transaction_conflict",
            PipelineError::Storage(StorageError::MergeUnimplemented) => "transaction_merge_unimplemented",
            PipelineError::Storage(StorageError::DanglingEdgeEndpoint(_)) => "dangling_edge_endpoint",
            PipelineError::Storage(StorageError::Generic { .. }) => "storage_error",
            PipelineError::InvalidStateTransition { .. } => "invalid_state_transition",
            PipelineError::JobNotFound(_) => "job_not_found",
            PipelineError::StageNotFound(_) => "stage_not_found",
            PipelineError::CheckpointNotFound { .. } => "checkpoint_not_found",
            PipelineError::DagCycleDetected => "dag_cycle_detected",
            PipelineError::MissingDependency { .. } => "missing_dependency",
            PipelineError::StageExecutionFailed { .. } => "stage_execution_failed",
            PipelineError::Timeout(_) => "timeout",
            PipelineError::Io(_) => "io_error",
            PipelineError::Parse(_) => "parse_error",
            PipelineError::Config(_) => "config_invalid",
        }
    }

    /// Classifies the error for retry scheduling (§7): only transient and
    /// infrastructure errors are worth a caller's backoff-and-retry.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Core(CoreError::ProviderUnavailable(_)) => ErrorCategory::Infrastructure,
            PipelineError::Core(CoreError::BudgetExhausted(_)) => ErrorCategory::Permanent,
            PipelineError::Core(CoreError::TransactionConflict { .. }) => ErrorCategory::Transient,
            PipelineError::Storage(StorageError::TransactionConflict { .. }) => ErrorCategory::Transient,
            PipelineError::Storage(e) if e.is_transient() => ErrorCategory::Infrastructure,
            PipelineError::Timeout(_) => ErrorCategory::Transient,
            PipelineError::Io(_) => ErrorCategory::Infrastructure,
            _ => ErrorCategory::Permanent,
        }
    }
}

/// Broad classification used to decide whether a failed stage is worth
/// retrying (§7 transient/fatal split).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    Transient,
    Permanent,
    Infrastructure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::Permanent => "permanent",
            ErrorCategory::Infrastructure => "infrastructure",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "transient" => Ok(ErrorCategory::Transient),
            "permanent" => Ok(ErrorCategory::Permanent),
            "infrastructure" => Ok(ErrorCategory::Infrastructure),
            _ => Err(PipelineError::parse(format!("invalid error category: {s}"))),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_code_passes_through() {
        let err = PipelineError::Core(CoreError::budget_exhausted("token budget spent"));
        assert_eq!(err.code(), "budget_exhausted");
    }

    #[test]
    fn budget_exhausted_is_permanent_not_retried() {
        let err = PipelineError::Core(CoreError::budget_exhausted("token budget spent"));
        assert_eq!(err.category(), ErrorCategory::Permanent);
    }

    #[test]
    fn transaction_conflict_is_transient() {
        let err = PipelineError::Storage(StorageError::TransactionConflict { retries: 2 });
        assert_eq!(err.category(), ErrorCategory::Transient);
        assert_eq!(err.code(), "transaction_conflict");
    }

    #[test]
    fn error_category_roundtrips_through_str() {
        for category in [ErrorCategory::Transient, ErrorCategory::Permanent, ErrorCategory::Infrastructure] {
            assert_eq!(ErrorCategory::from_str(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_string_is_rejected() {
        assert!(ErrorCategory::from_str("nonsense").is_err());
    }
}
