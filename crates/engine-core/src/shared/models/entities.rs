//! File, function, module, and edge entities (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceValue;
use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Code,
    Test,
    Config,
    Doc,
}

/// Staleness class (spec §4.C). Also recorded on `FileEntity` as its
/// durability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    Immutable,
    Stable,
    Volatile,
    /// Not one of the three staleness classes: the file could not be found
    /// on disk when classified.
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntity {
    /// Workspace-relative path, normalized to forward slashes.
    pub path: String,
    pub category: FileCategory,
    /// SHA-256 hex, truncated to 16 hex chars for interning.
    pub checksum: String,
    pub last_indexed: Option<DateTime<Utc>>,
    pub last_modified: DateTime<Utc>,
    pub durability: Durability,
}

impl FileEntity {
    /// Normalize a path the way every entry point into this crate must
    /// before comparing or classifying it (invariant: staleness glob
    /// matching happens after normalization).
    pub fn normalize_path(path: &str) -> String {
        path.replace('\\', "/")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntity {
    pub id: EntityId,
    pub file_path: String,
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub signature: String,
    pub purpose: Option<String>,
    pub confidence: f64,
    pub access_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
}

impl FunctionEntity {
    /// Canonical pack-target id form (invariant §3.1): `"{path}:{name}"`.
    pub fn target_id(&self) -> String {
        format!("{}:{}", self.file_path, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntity {
    pub path: String,
    pub purpose: Option<String>,
    pub exports: Vec<String>,
    /// File paths and/or package identifiers this module depends on, in
    /// discovery order.
    pub dependencies: Vec<String>,
    pub confidence: f64,
}

impl ModuleEntity {
    /// Canonical pack-target id form for module packs: the bare path.
    pub fn target_id(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Calls,
    Imports,
    ReviewedBy,
    AuthoredBy,
    Documents,
    Tests,
    PartOf,
    SimilarTo,
    DependsOn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from_id: EntityId,
    pub to_id: EntityId,
    pub edge_type: EdgeType,
    pub source_file: String,
    pub weight: f64,
    pub confidence: ConfidenceValue,
    pub computed_at: DateTime<Utc>,
}

impl Edge {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        edge_type: EdgeType,
        source_file: impl Into<String>,
        weight: f64,
        confidence: ConfidenceValue,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            edge_type,
            source_file: source_file.into(),
            weight: weight.clamp(0.0, 1.0),
            confidence,
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_target_id_is_path_colon_name() {
        let f = FunctionEntity {
            id: "f1".into(),
            file_path: "src/auth.rs".into(),
            name: "login".into(),
            start_line: 1,
            end_line: 10,
            signature: "fn login()".into(),
            purpose: None,
            confidence: 0.5,
            access_count: 0,
            success_count: 0,
            failure_count: 0,
        };
        assert_eq!(f.target_id(), "src/auth.rs:login");
    }

    #[test]
    fn normalize_path_converts_backslashes() {
        assert_eq!(
            FileEntity::normalize_path("src\\auth\\mod.rs"),
            "src/auth/mod.rs"
        );
    }
}
