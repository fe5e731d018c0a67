//! engine-core — in-process types and algorithms for the knowledge engine.
//!
//! This crate owns the data model, the content cache, the staleness tracker,
//! the embedding core, graph metrics, the retrieval engine, the epistemic
//! layer, the feedback loop, and retrieval-quality measurement. It performs
//! no file or database I/O itself:
//! indexing orchestration lives in `engine-pipeline`, durable persistence in
//! `engine-storage`. External LLM/embedding providers are consumed through
//! the traits in [`provider`].

#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod errors;
pub mod features;
pub mod provider;
pub mod shared;

pub use errors::{CoreError, Result};
pub use shared::models;
