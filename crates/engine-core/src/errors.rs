//! Error types for engine-core.
//!
//! Every variant exposes a stable `code()` string from the vocabulary the rest
//! of the system (and its callers) key off of. Fatal variants never recover
//! silently; transient ones are retried by callers that hold the retry policy
//! (the durable store, the pipeline worker pool), not by this crate.

use thiserror::Error;

/// Result alias for engine-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("embedding/LLM provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("budget exhausted: {0}")]
    BudgetExhausted(String),

    #[error("session not found: {0}")]
    SessionMissing(String),

    #[error("session limit exceeded (max {max})")]
    SessionLimitExceeded { max: usize },

    #[error("session pack limit exceeded (max {max})")]
    SessionPackLimitExceeded { max: usize },

    #[error("follow-up question is empty or whitespace-only")]
    SessionQuestionInvalid,

    #[error("transaction conflict after {retries} retries")]
    TransactionConflict { retries: u32 },

    #[error("composition validation failed: {0}")]
    Composition(#[from] CompositionError),

    #[error("evidence entry invalid: {0}")]
    EvidenceInvalid(String),

    #[error("purpose input invalid: {0}")]
    PurposeInputInvalid(String),

    #[error("vector dimension mismatch: expected {expected}, got {got} for model {model_id}")]
    VectorDimensionMismatch {
        model_id: String,
        expected: usize,
        got: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Stable error code, independent of the human-readable message.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ProviderUnavailable(_) => "provider_unavailable",
            CoreError::BudgetExhausted(_) => "budget_exhausted",
            CoreError::SessionMissing(_) => "context_session_missing",
            CoreError::SessionLimitExceeded { .. } => "context_session_limit_exceeded",
            CoreError::SessionPackLimitExceeded { .. } => "context_session_pack_limit_exceeded",
            CoreError::SessionQuestionInvalid => "context_session_question_invalid",
            CoreError::TransactionConflict { .. } => "transaction_conflict",
            CoreError::Composition(e) => e.code(),
            CoreError::EvidenceInvalid(_) => "evidence_invalid_entry",
            CoreError::PurposeInputInvalid(_) => "purpose_input_invalid",
            CoreError::VectorDimensionMismatch { .. } => "vector_dimension_mismatch",
            CoreError::Config(_) => "config_invalid",
        }
    }

    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        CoreError::ProviderUnavailable(msg.into())
    }

    pub fn budget_exhausted(msg: impl Into<String>) -> Self {
        CoreError::BudgetExhausted(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        CoreError::Config(msg.into())
    }
}

/// Referential-integrity and shape errors for composition graphs (4.J support
/// graphs, pack invalidation triggers, evidence/defeater/contradiction edges).
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("missing primitives: {0:?}")]
    MissingPrimitives(Vec<String>),

    #[error("duplicate operator ids: {0:?}")]
    DuplicateOperatorIds(Vec<String>),

    #[error("invalid graph version: {0}")]
    GraphVersionInvalid(u32),

    #[error("edge {edge_id} references a non-edge operator {operator_id}")]
    RelationshipEdgeOperator { edge_id: String, operator_id: String },

    #[error("relationship references unknown operators: {0:?}")]
    MissingRelationshipRefs(Vec<String>),

    #[error("operator id collision: {0}")]
    OperatorIdCollision(String),

    #[error("dependency cycle detected among: {0:?}")]
    DependencyCycle(Vec<String>),
}

impl CompositionError {
    pub fn code(&self) -> &'static str {
        match self {
            CompositionError::MissingPrimitives(_) => "composition_missing_primitives",
            CompositionError::DuplicateOperatorIds(_) => "composition_duplicate_operator_ids",
            CompositionError::GraphVersionInvalid(_) => "composition_graph_version_invalid",
            CompositionError::RelationshipEdgeOperator { .. } => {
                "composition_relationship_edge_operator"
            }
            CompositionError::MissingRelationshipRefs(_) => {
                "composition_missing_relationship_refs"
            }
            CompositionError::OperatorIdCollision(_) => "composition_operator_id_collision",
            CompositionError::DependencyCycle(_) => "composition_dependency_cycle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable_strings() {
        assert_eq!(
            CoreError::SessionQuestionInvalid.code(),
            "context_session_question_invalid"
        );
        assert_eq!(
            CoreError::Composition(CompositionError::GraphVersionInvalid(3)).code(),
            "composition_graph_version_invalid"
        );
    }
}
