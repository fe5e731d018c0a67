//! Concrete storage adapters implementing the `domain::Storage` port.

pub mod sqlite;

pub use sqlite::SqliteStore;
