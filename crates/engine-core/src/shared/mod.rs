//! Shared module - Common types used across all features.
//!
//! Zero I/O: everything here is pure data and pure functions.

pub mod constants;
pub mod models;

pub use models::*;
