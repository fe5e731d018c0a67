//! `ContextPack` and `Session` (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackType {
    FunctionContext,
    ModuleContext,
    ChangeImpact,
    PatternContext,
    DecisionContext,
    SimilarTasks,
    DocContext,
    ProjectUnderstanding,
    GitHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastOutcome {
    Unknown,
    Success,
    Failure,
}

/// A minimized code excerpt attached to a pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPack {
    pub pack_id: uuid::Uuid,
    pub pack_type: PackType,
    pub target_id: String,
    /// At most 240 characters (enforced by `ContextPack::new`).
    pub summary: String,
    pub key_facts: Vec<String>,
    pub code_snippets: Vec<CodeSnippet>,
    pub related_files: Vec<String>,
    pub confidence: f64,
    pub access_count: u64,
    pub last_outcome: LastOutcome,
    pub success_count: u64,
    pub failure_count: u64,
    pub version: u32,
    pub invalidation_triggers: Vec<String>,
}

impl ContextPack {
    pub const MAX_SUMMARY_CHARS: usize = 240;

    pub fn new(
        pack_type: PackType,
        target_id: impl Into<String>,
        summary: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let mut summary = summary.into();
        if summary.chars().count() > Self::MAX_SUMMARY_CHARS {
            summary = summary.chars().take(Self::MAX_SUMMARY_CHARS).collect();
        }
        Self {
            pack_id: uuid::Uuid::new_v4(),
            pack_type,
            target_id: target_id.into(),
            summary,
            key_facts: Vec::new(),
            code_snippets: Vec::new(),
            related_files: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
            access_count: 0,
            last_outcome: LastOutcome::Unknown,
            success_count: 0,
            failure_count: 0,
            version: 1,
            invalidation_triggers: Vec::new(),
        }
    }

    /// True when any of `invalidation_triggers` is in `changed_files`
    /// (lifecycle rule: packs are invalidated when a trigger file changes).
    pub fn is_invalidated_by(&self, changed_files: &[String]) -> bool {
        self.invalidation_triggers
            .iter()
            .any(|t| changed_files.iter().any(|c| c == t))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: uuid::Uuid,
    pub history: Vec<String>,
    pub packs: Vec<uuid::Uuid>,
    pub explored_entities: HashMap<String, ()>,
    pub focus_area: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4(),
            history: Vec::new(),
            packs: Vec::new(),
            explored_entities: HashMap::new(),
            focus_area: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl_ms: i64) -> bool {
        (now - self.last_activity_at).num_milliseconds() > ttl_ms
    }
}
