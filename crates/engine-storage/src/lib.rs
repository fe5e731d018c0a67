//! The durable store (spec §4.B): an embedded SQL engine behind a typed
//! `Storage` port. No raw SQL crosses the port boundary — callers read and
//! write `engine_core` domain types, and optimistic concurrency plus
//! append-only evidence are enforced inside the adapter, not by callers.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{ConflictResolution, PackOutcome, Storage, TimeRange};
pub use error::{ErrorKind, Result, StorageError};
pub use infrastructure::SqliteStore;
