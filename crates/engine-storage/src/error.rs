//! Error types for engine-storage.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Database,
    Serialization,
    NotFound,
    Transaction,
    Constraint,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Database => "database",
            ErrorKind::Serialization => "serialization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Transaction => "transaction",
            ErrorKind::Constraint => "constraint",
            ErrorKind::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage error type (spec §4.B failure semantics).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("[{kind}] {message}")]
    Generic {
        kind: ErrorKind,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Conflict survived every retry attempt (spec §4.B concurrency contract).
    #[error("transaction conflict after {retries} retries")]
    TransactionConflict { retries: u32 },

    /// `merge` conflict-resolution strategy is reserved but not implemented
    /// (spec §4.B, `unverified_by_trace(transaction_merge_unimplemented)`).
    #[error("merge conflict resolution is not implemented")]
    MergeUnimplemented,

    /// An edge referenced an endpoint not present in its table (or the same
    /// batch) at insertion time.
    #[error("edge endpoint not found: {0}")]
    DanglingEdgeEndpoint(String),
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        StorageError::Generic { kind, message: message.into(), source: None }
    }

    pub fn with_source(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        match self {
            StorageError::Generic { kind, message, .. } => StorageError::Generic { kind, message, source: Some(Box::new(source)) },
            other => other,
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn not_found(entity: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, format!("{entity} not found: {id}"))
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Constraint, message)
    }

    /// True for errors a retry wrapper should retry (lock contention,
    /// busy database); false for schema/constraint errors, which are fatal.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Generic { kind: ErrorKind::Database, .. })
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::database(format!("sqlite error: {err}")).with_source(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::serialization(format!("json error: {err}")).with_source(err)
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_error_displays_kind_and_message() {
        let err = StorageError::database("connection refused");
        assert_eq!(format!("{err}"), "[database] connection refused");
    }

    #[test]
    fn not_found_includes_entity_and_id() {
        let err = StorageError::not_found("context pack", "abc-123");
        assert!(format!("{err}").contains("context pack not found: abc-123"));
    }

    #[test]
    fn only_database_errors_are_transient() {
        assert!(StorageError::database("busy").is_transient());
        assert!(!StorageError::constraint("bad ref").is_transient());
        assert!(!StorageError::TransactionConflict { retries: 3 }.is_transient());
    }
}
