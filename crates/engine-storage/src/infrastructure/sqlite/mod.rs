//! Embedded SQL durable store (spec §4.B): one `rusqlite` connection in WAL
//! mode, typed operations only — no raw SQL crosses the `Storage` port.

mod vectors;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine_core::models::{
    CacheEntry, CalibrationReport, ContextPack, Edge, EvidenceEntry, EvidenceKind, FileEntity, FunctionEntity,
    ModuleEntity, MultiVector,
};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{PackOutcome, Storage, TimeRange};
use crate::error::StorageError;
use crate::Result;

use vectors::{decode_vector, encode_vector};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    checksum TEXT NOT NULL,
    last_indexed TEXT,
    last_modified TEXT NOT NULL,
    durability TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS functions (
    id TEXT PRIMARY KEY,
    file_path TEXT NOT NULL,
    name TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    signature TEXT NOT NULL,
    purpose TEXT,
    confidence REAL NOT NULL,
    access_count INTEGER NOT NULL,
    success_count INTEGER NOT NULL,
    failure_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS modules (
    path TEXT PRIMARY KEY,
    purpose TEXT,
    exports_json TEXT NOT NULL,
    dependencies_json TEXT NOT NULL,
    confidence REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    edge_type TEXT NOT NULL,
    source_file TEXT NOT NULL,
    weight REAL NOT NULL,
    confidence_json TEXT NOT NULL,
    computed_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS edges_from_id ON edges(from_id);

CREATE TABLE IF NOT EXISTS context_packs (
    pack_id TEXT PRIMARY KEY,
    version INTEGER NOT NULL,
    data_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS embeddings (
    file_path TEXT PRIMARY KEY,
    model_id TEXT NOT NULL,
    last_updated TEXT NOT NULL,
    inputs_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS embedding_vectors (
    file_path TEXT NOT NULL,
    aspect TEXT NOT NULL,
    vector_blob BLOB NOT NULL,
    PRIMARY KEY (file_path, aspect)
);

CREATE TABLE IF NOT EXISTS content_cache (
    content_hash TEXT NOT NULL,
    analysis_version TEXT NOT NULL,
    result_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    access_count INTEGER NOT NULL,
    last_accessed TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    PRIMARY KEY (content_hash, analysis_version)
);

CREATE TABLE IF NOT EXISTS evidence_ledger (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL,
    payload_json TEXT NOT NULL,
    provenance_json TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    related_entries_json TEXT NOT NULL,
    confidence_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS outcomes (
    pack_id TEXT NOT NULL,
    success INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS outcomes_pack_id ON outcomes(pack_id);

CREATE TABLE IF NOT EXISTS calibration_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    generated_at TEXT NOT NULL,
    report_json TEXT NOT NULL
);
"#;

/// A `rusqlite::Connection` behind a `tokio::Mutex`: every operation is a
/// single short-lived statement, so serializing access costs little and
/// keeps the adapter free of connection-pool bookkeeping.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn entity_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
        let in_files: bool = conn
            .query_row("SELECT 1 FROM files WHERE path = ?1", params![id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if in_files {
            return Ok(true);
        }
        let in_functions: bool = conn
            .query_row("SELECT 1 FROM functions WHERE id = ?1", params![id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if in_functions {
            return Ok(true);
        }
        conn.query_row("SELECT 1 FROM modules WHERE path = ?1", params![id], |_| Ok(true))
            .optional()
            .map(|r| r.unwrap_or(false))
    }
}

#[async_trait]
impl Storage for SqliteStore {
    async fn upsert_file(&self, file: &FileEntity) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO files (path, category, checksum, last_indexed, last_modified, durability)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(path) DO UPDATE SET
                category = excluded.category,
                checksum = excluded.checksum,
                last_indexed = excluded.last_indexed,
                last_modified = excluded.last_modified,
                durability = excluded.durability",
            params![
                file.path,
                serde_json::to_string(&file.category)?,
                file.checksum,
                file.last_indexed.map(|t| t.to_rfc3339()),
                file.last_modified.to_rfc3339(),
                serde_json::to_string(&file.durability)?,
            ],
        )?;
        Ok(())
    }

    async fn get_file(&self, path: &str) -> Result<Option<FileEntity>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT path, category, checksum, last_indexed, last_modified, durability FROM files WHERE path = ?1",
            params![path],
            |row| {
                let category: String = row.get(1)?;
                let last_indexed: Option<String> = row.get(3)?;
                let last_modified: String = row.get(4)?;
                let durability: String = row.get(5)?;
                Ok((row.get::<_, String>(0)?, category, row.get::<_, String>(2)?, last_indexed, last_modified, durability))
            },
        )
        .optional()?
        .map(|(path, category, checksum, last_indexed, last_modified, durability)| {
            Ok(FileEntity {
                path,
                category: serde_json::from_str(&category)?,
                checksum,
                last_indexed: last_indexed.map(|t| parse_time(&t)).transpose()?,
                last_modified: parse_time(&last_modified)?,
                durability: serde_json::from_str(&durability)?,
            })
        })
        .transpose()
    }

    async fn upsert_function(&self, function: &FunctionEntity) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO functions (id, file_path, name, start_line, end_line, signature, purpose, confidence, access_count, success_count, failure_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                file_path = excluded.file_path,
                name = excluded.name,
                start_line = excluded.start_line,
                end_line = excluded.end_line,
                signature = excluded.signature,
                purpose = excluded.purpose,
                confidence = excluded.confidence,
                access_count = excluded.access_count,
                success_count = excluded.success_count,
                failure_count = excluded.failure_count",
            params![
                function.id,
                function.file_path,
                function.name,
                function.start_line,
                function.end_line,
                function.signature,
                function.purpose,
                function.confidence,
                function.access_count as i64,
                function.success_count as i64,
                function.failure_count as i64,
            ],
        )?;
        Ok(())
    }

    async fn get_function(&self, id: &str) -> Result<Option<FunctionEntity>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, file_path, name, start_line, end_line, signature, purpose, confidence, access_count, success_count, failure_count
             FROM functions WHERE id = ?1",
            params![id],
            |row| {
                Ok(FunctionEntity {
                    id: row.get(0)?,
                    file_path: row.get(1)?,
                    name: row.get(2)?,
                    start_line: row.get(3)?,
                    end_line: row.get(4)?,
                    signature: row.get(5)?,
                    purpose: row.get(6)?,
                    confidence: row.get(7)?,
                    access_count: row.get::<_, i64>(8)? as u64,
                    success_count: row.get::<_, i64>(9)? as u64,
                    failure_count: row.get::<_, i64>(10)? as u64,
                })
            },
        )
        .optional()
        .map_err(StorageError::from)
    }

    async fn upsert_module(&self, module: &ModuleEntity) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO modules (path, purpose, exports_json, dependencies_json, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(path) DO UPDATE SET
                purpose = excluded.purpose,
                exports_json = excluded.exports_json,
                dependencies_json = excluded.dependencies_json,
                confidence = excluded.confidence",
            params![
                module.path,
                module.purpose,
                serde_json::to_string(&module.exports)?,
                serde_json::to_string(&module.dependencies)?,
                module.confidence,
            ],
        )?;
        Ok(())
    }

    async fn get_module(&self, id: &str) -> Result<Option<ModuleEntity>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT path, purpose, exports_json, dependencies_json, confidence FROM modules WHERE path = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                ))
            },
        )
        .optional()?
        .map(|(path, purpose, exports_json, deps_json, confidence)| {
            Ok(ModuleEntity {
                path,
                purpose,
                exports: serde_json::from_str(&exports_json)?,
                dependencies: serde_json::from_str(&deps_json)?,
                confidence,
            })
        })
        .transpose()
    }

    async fn insert_edge(&self, edge: &Edge) -> Result<()> {
        let conn = self.conn.lock().await;
        if !Self::entity_exists(&conn, &edge.from_id)? {
            return Err(StorageError::DanglingEdgeEndpoint(edge.from_id.clone()));
        }
        if !Self::entity_exists(&conn, &edge.to_id)? {
            return Err(StorageError::DanglingEdgeEndpoint(edge.to_id.clone()));
        }
        conn.execute(
            "INSERT INTO edges (from_id, to_id, edge_type, source_file, weight, confidence_json, computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                edge.from_id,
                edge.to_id,
                serde_json::to_string(&edge.edge_type)?,
                edge.source_file,
                edge.weight,
                serde_json::to_string(&edge.confidence)?,
                edge.computed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get_edges_from(&self, entity_id: &str) -> Result<Vec<Edge>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT from_id, to_id, edge_type, source_file, weight, confidence_json, computed_at
             FROM edges WHERE from_id = ?1",
        )?;
        let rows = stmt.query_map(params![entity_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let mut edges = Vec::new();
        for row in rows {
            let (from_id, to_id, edge_type, source_file, weight, confidence_json, computed_at) = row?;
            edges.push(Edge {
                from_id,
                to_id,
                edge_type: serde_json::from_str(&edge_type)?,
                source_file,
                weight,
                confidence: serde_json::from_str(&confidence_json)?,
                computed_at: parse_time(&computed_at)?,
            });
        }
        Ok(edges)
    }

    async fn upsert_context_pack(&self, pack: &ContextPack, expected_version: Option<u32>) -> Result<()> {
        let conn = self.conn.lock().await;
        let current_version: Option<u32> = conn
            .query_row("SELECT version FROM context_packs WHERE pack_id = ?1", params![pack.pack_id.to_string()], |row| row.get(0))
            .optional()?;

        if let (Some(current), Some(expected)) = (current_version, expected_version) {
            if current != expected {
                return Err(StorageError::TransactionConflict { retries: 0 });
            }
        }

        conn.execute(
            "INSERT INTO context_packs (pack_id, version, data_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(pack_id) DO UPDATE SET version = excluded.version, data_json = excluded.data_json",
            params![pack.pack_id.to_string(), pack.version, serde_json::to_string(pack)?],
        )?;
        Ok(())
    }

    async fn get_context_pack(&self, pack_id: Uuid) -> Result<Option<ContextPack>> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT data_json FROM context_packs WHERE pack_id = ?1", params![pack_id.to_string()], |row| {
            row.get::<_, String>(0)
        })
        .optional()?
        .map(|json| Ok(serde_json::from_str(&json)?))
        .transpose()
    }

    async fn upsert_embedding(&self, vector: &MultiVector) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO embeddings (file_path, model_id, last_updated, inputs_json) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(file_path) DO UPDATE SET model_id = excluded.model_id, last_updated = excluded.last_updated, inputs_json = excluded.inputs_json",
            params![vector.file_path, vector.model_id, vector.last_updated.to_rfc3339(), serde_json::to_string(&vector.inputs)?],
        )?;
        tx.execute("DELETE FROM embedding_vectors WHERE file_path = ?1", params![vector.file_path])?;
        for (aspect, values) in &vector.vectors {
            tx.execute(
                "INSERT INTO embedding_vectors (file_path, aspect, vector_blob) VALUES (?1, ?2, ?3)",
                params![vector.file_path, serde_json::to_string(aspect)?, encode_vector(values)],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn get_embedding(&self, file_path: &str) -> Result<Option<MultiVector>> {
        let conn = self.conn.lock().await;
        let head = conn
            .query_row(
                "SELECT model_id, last_updated, inputs_json FROM embeddings WHERE file_path = ?1",
                params![file_path],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()?;
        let Some((model_id, last_updated, inputs_json)) = head else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT aspect, vector_blob FROM embedding_vectors WHERE file_path = ?1")?;
        let rows = stmt.query_map(params![file_path], |row| Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?)))?;
        let mut vectors = std::collections::HashMap::new();
        for row in rows {
            let (aspect_json, blob) = row?;
            vectors.insert(serde_json::from_str(&aspect_json)?, decode_vector(&blob)?);
        }

        Ok(Some(MultiVector {
            file_path: file_path.to_string(),
            model_id,
            last_updated: parse_time(&last_updated)?,
            vectors,
            inputs: serde_json::from_str(&inputs_json)?,
        }))
    }

    async fn cache_set(&self, entry: &CacheEntry<serde_json::Value>) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO content_cache (content_hash, analysis_version, result_json, created_at, access_count, last_accessed, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(content_hash, analysis_version) DO UPDATE SET
                result_json = excluded.result_json,
                access_count = excluded.access_count,
                last_accessed = excluded.last_accessed,
                size_bytes = excluded.size_bytes",
            params![
                entry.content_hash,
                entry.analysis_version,
                serde_json::to_string(&entry.result)?,
                entry.created_at.to_rfc3339(),
                entry.access_count as i64,
                entry.last_accessed.to_rfc3339(),
                entry.size_bytes as i64,
            ],
        )?;
        Ok(())
    }

    async fn cache_get(&self, content_hash: &str, analysis_version: &str) -> Result<Option<CacheEntry<serde_json::Value>>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT result_json, created_at, access_count, last_accessed, size_bytes
             FROM content_cache WHERE content_hash = ?1 AND analysis_version = ?2",
            params![content_hash, analysis_version],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )
        .optional()?
        .map(|(result_json, created_at, access_count, last_accessed, size_bytes)| {
            Ok(CacheEntry {
                content_hash: content_hash.to_string(),
                analysis_version: analysis_version.to_string(),
                result: serde_json::from_str(&result_json)?,
                created_at: parse_time(&created_at)?,
                access_count: access_count as u64,
                last_accessed: parse_time(&last_accessed)?,
                size_bytes: size_bytes as u64,
            })
        })
        .transpose()
    }

    async fn cache_invalidate_by_version(&self, stale_version: &str) -> Result<u64> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM content_cache WHERE analysis_version = ?1", params![stale_version])?;
        Ok(affected as u64)
    }

    async fn append_evidence(&self, entry: &EvidenceEntry) -> Result<()> {
        let conn = self.conn.lock().await;
        let exists: bool = conn
            .query_row("SELECT 1 FROM evidence_ledger WHERE id = ?1", params![entry.id as i64], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if exists {
            return Err(StorageError::constraint(format!("evidence entry {} already exists; ledger is append-only", entry.id)));
        }
        conn.execute(
            "INSERT INTO evidence_ledger (id, kind, payload_json, provenance_json, timestamp, related_entries_json, confidence_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id as i64,
                serde_json::to_string(&entry.kind)?,
                serde_json::to_string(&entry.payload)?,
                serde_json::to_string(&entry.provenance)?,
                entry.timestamp.to_rfc3339(),
                serde_json::to_string(&entry.related_entries)?,
                serde_json::to_string(&entry.confidence)?,
            ],
        )?;
        Ok(())
    }

    async fn query_evidence(&self, kinds: &[EvidenceKind], time_range: Option<TimeRange>, limit: usize) -> Result<Vec<EvidenceEntry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, kind, payload_json, provenance_json, timestamp, related_entries_json, confidence_json
             FROM evidence_ledger ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, kind_json, payload_json, provenance_json, timestamp, related_json, confidence_json) = row?;
            let kind: EvidenceKind = serde_json::from_str(&kind_json)?;
            if !kinds.is_empty() && !kinds.contains(&kind) {
                continue;
            }
            let timestamp = parse_time(&timestamp)?;
            if let Some(range) = time_range {
                if timestamp < range.from || timestamp > range.to {
                    continue;
                }
            }
            out.push(EvidenceEntry {
                id: id as u64,
                kind,
                payload: serde_json::from_str(&payload_json)?,
                provenance: serde_json::from_str(&provenance_json)?,
                timestamp,
                related_entries: serde_json::from_str(&related_json)?,
                confidence: serde_json::from_str(&confidence_json)?,
            });
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }

    async fn record_outcome(&self, pack_id: Uuid, success: bool, recorded_at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO outcomes (pack_id, success, recorded_at) VALUES (?1, ?2, ?3)",
            params![pack_id.to_string(), success as i64, recorded_at.to_rfc3339()],
        )?;
        Ok(())
    }

    async fn get_outcomes(&self, pack_id: Uuid) -> Result<Vec<PackOutcome>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT success, recorded_at FROM outcomes WHERE pack_id = ?1 ORDER BY recorded_at ASC")?;
        let rows = stmt.query_map(params![pack_id.to_string()], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            let (success, recorded_at) = row?;
            out.push(PackOutcome { success: success != 0, recorded_at: parse_time(&recorded_at)? });
        }
        Ok(out)
    }

    async fn save_calibration_report(&self, report: &CalibrationReport) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO calibration_reports (generated_at, report_json) VALUES (?1, ?2)",
            params![report.generated_at.to_rfc3339(), serde_json::to_string(report)?],
        )?;
        Ok(())
    }

    async fn get_latest_calibration_report(&self) -> Result<Option<CalibrationReport>> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT report_json FROM calibration_reports ORDER BY id DESC LIMIT 1", [], |row| row.get::<_, String>(0))
            .optional()?
            .map(|json| Ok(serde_json::from_str(&json)?))
            .transpose()
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::serialization(format!("invalid timestamp {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::models::{Durability, FileCategory};

    fn sample_file(path: &str) -> FileEntity {
        FileEntity {
            path: path.to_string(),
            category: FileCategory::Code,
            checksum: "abc123".to_string(),
            last_indexed: None,
            last_modified: Utc::now(),
            durability: Durability::Stable,
        }
    }

    #[tokio::test]
    async fn file_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let file = sample_file("src/auth.rs");
        store.upsert_file(&file).await.unwrap();
        let back = store.get_file("src/auth.rs").await.unwrap().unwrap();
        assert_eq!(back.checksum, "abc123");
        assert_eq!(back.durability, Durability::Stable);
    }

    #[tokio::test]
    async fn missing_file_returns_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_file("nope.rs").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn edge_with_unknown_endpoint_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_file(&sample_file("src/a.rs")).await.unwrap();
        let edge = Edge::new(
            "src/a.rs",
            "src/missing.rs",
            engine_core::models::EdgeType::Imports,
            "src/a.rs",
            1.0,
            engine_core::models::ConfidenceValue::deterministic_true("parser"),
            Utc::now(),
        );
        let err = store.insert_edge(&edge).await.unwrap_err();
        assert!(matches!(err, StorageError::DanglingEdgeEndpoint(_)));
    }

    #[tokio::test]
    async fn edge_between_known_entities_succeeds() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_file(&sample_file("src/a.rs")).await.unwrap();
        store.upsert_file(&sample_file("src/b.rs")).await.unwrap();
        let edge = Edge::new(
            "src/a.rs",
            "src/b.rs",
            engine_core::models::EdgeType::Imports,
            "src/a.rs",
            1.0,
            engine_core::models::ConfidenceValue::deterministic_true("parser"),
            Utc::now(),
        );
        store.insert_edge(&edge).await.unwrap();
        let edges = store.get_edges_from("src/a.rs").await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_id, "src/b.rs");
    }

    #[tokio::test]
    async fn context_pack_upsert_conflict_on_stale_version() {
        let store = SqliteStore::open_in_memory().unwrap();
        let pack = ContextPack::new(engine_core::models::PackType::FunctionContext, "src/a.rs:f", "summary", 0.5);
        store.upsert_context_pack(&pack, None).await.unwrap();

        let mut stale = pack.clone();
        stale.version = 5;
        let err = store.upsert_context_pack(&stale, Some(99)).await.unwrap_err();
        assert!(matches!(err, StorageError::TransactionConflict { .. }));
    }

    #[tokio::test]
    async fn embedding_round_trips_vectors_and_inputs() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut mv = MultiVector::new("src/a.rs", "model-a", Utc::now());
        mv.set_aspect(engine_core::models::Aspect::Purpose, vec![0.1, 0.2, 0.3], "purpose text".into());
        store.upsert_embedding(&mv).await.unwrap();

        let back = store.get_embedding("src/a.rs").await.unwrap().unwrap();
        assert_eq!(back.get(engine_core::models::Aspect::Purpose), Some(vec![0.1, 0.2, 0.3].as_slice()));
        assert_eq!(back.model_id, "model-a");
    }

    #[tokio::test]
    async fn evidence_ledger_rejects_duplicate_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        let entry = EvidenceEntry {
            id: 1,
            kind: EvidenceKind::Claim,
            payload: serde_json::json!({"x": 1}),
            provenance: engine_core::models::Provenance { source: "s".into(), method: "m".into() },
            timestamp: Utc::now(),
            related_entries: Vec::new(),
            confidence: engine_core::models::ConfidenceValue::deterministic_true("s"),
        };
        store.append_evidence(&entry).await.unwrap();
        let err = store.append_evidence(&entry).await.unwrap_err();
        assert!(matches!(err, StorageError::Generic { .. }));
    }

    #[tokio::test]
    async fn query_evidence_filters_by_kind_and_returns_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (id, kind) in [(1, EvidenceKind::Claim), (2, EvidenceKind::Outcome), (3, EvidenceKind::Claim)] {
            let entry = EvidenceEntry {
                id,
                kind,
                payload: serde_json::json!({}),
                provenance: engine_core::models::Provenance { source: "s".into(), method: "m".into() },
                timestamp: Utc::now(),
                related_entries: Vec::new(),
                confidence: engine_core::models::ConfidenceValue::deterministic_true("s"),
            };
            store.append_evidence(&entry).await.unwrap();
        }
        let claims = store.query_evidence(&[EvidenceKind::Claim], None, 10).await.unwrap();
        assert_eq!(claims.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 1]);
    }

    #[tokio::test]
    async fn cache_set_and_invalidate_by_version() {
        let store = SqliteStore::open_in_memory().unwrap();
        let entry = CacheEntry {
            content_hash: "hash1".to_string(),
            analysis_version: "v1".to_string(),
            result: serde_json::json!({"ok": true}),
            created_at: Utc::now(),
            access_count: 0,
            last_accessed: Utc::now(),
            size_bytes: 10,
        };
        store.cache_set(&entry).await.unwrap();
        assert!(store.cache_get("hash1", "v1").await.unwrap().is_some());
        let removed = store.cache_invalidate_by_version("v1").await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.cache_get("hash1", "v1").await.unwrap().is_none());
    }
}
