//! External collaborators the core consumes but does not implement.
//!
//! Concrete adapters (an HTTP client for a hosted embedding API, a subprocess
//! wrapper around `git`, a specific LLM vendor's chat API) live outside this
//! crate entirely; this module only fixes the trait shape so `engine-core` and
//! `engine-pipeline` can be written against it and tested with fakes.

use async_trait::async_trait;
use std::path::Path;

use crate::errors::Result;

/// A text embedding provider. Implementations are expected to be
/// deterministic for a given `(text, model_id)` pair up to their own
/// provider's guarantees; callers treat embedding failures as
/// `provider_unavailable`.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str, model_id: &str) -> Result<Vec<f32>>;

    /// Dimensionality produced for `model_id`, if known ahead of an actual
    /// call (used to validate `MultiVector` invariants before embedding).
    fn dimension(&self, model_id: &str) -> Option<usize>;
}

/// A single chat-completion turn sent to an LLM provider.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub provider: String,
    pub model_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
}

/// A governor tracks a bounded budget (tokens, wall time, money) across a
/// single indexing run. `check_budget` is called before any LLM or large
/// embedding batch; budget exhaustion is fatal for the current operation and
/// is never retried.
pub trait Governor: Send + Sync {
    fn check_budget(&self) -> Result<()>;
    fn record_spend(&self, tokens: u64);
    fn remaining_tokens(&self) -> u64;
}

#[async_trait]
pub trait LlmService: Send + Sync {
    async fn chat(&self, request: ChatRequest, governor: &dyn Governor) -> Result<ChatResponse>;
}

/// Minimal file system surface the pipeline needs for structural scanning.
/// A real implementation reads the workspace directly; tests substitute an
/// in-memory map.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
    fn modified_unix_ms(&self, path: &Path) -> std::io::Result<i64>;
}

/// A single commit touching a bounded set of files, as consumed by the
/// co-change graph (4.F). `Git` is an optional collaborator: when absent,
/// co-change strength is simply never computed.
#[derive(Debug, Clone)]
pub struct CommitFiles {
    pub commit_hash: String,
    pub files: Vec<String>,
}

pub trait Git: Send + Sync {
    /// Up to `max_commits` most recent commits, each capped at
    /// `max_files_per_commit` files, newest first.
    fn recent_commits(
        &self,
        max_commits: usize,
        max_files_per_commit: usize,
    ) -> std::io::Result<Vec<CommitFiles>>;
}
