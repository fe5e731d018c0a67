//! Checkpoint persistence for resumable indexing runs (spec §4.D
//! resumability: "every write is committed before the next task starts; an
//! interrupted run loses at most the in-flight task").
//!
//! Checkpoints are written through `engine_storage::Storage`'s content
//! cache rather than kept in an independent in-memory store, so a restarted
//! process sees exactly the same completed-stage set a still-running one
//! would. The cache row's `content_hash` identifies `(job, stage)`; its
//! `analysis_version` column carries the stage's cache key (workspace +
//! `EngineConfig::analysis_version`), so bumping the analysis version
//! naturally orphans stale checkpoints instead of requiring an explicit
//! per-job delete.

use crate::dag::CacheKeyManager;
use crate::error::Result;
use crate::job::StageId;
use chrono::{DateTime, Utc};
use engine_core::models::CacheEntry;
use engine_storage::Storage;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct CheckpointManager {
    storage: Arc<dyn Storage>,
}

fn content_hash(job_id: Uuid, stage: StageId) -> String {
    format!("checkpoint:{job_id}:{}", stage.as_str())
}

impl CheckpointManager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn save_checkpoint(
        &self,
        job_id: Uuid,
        stage: StageId,
        cache_key: String,
        data: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = CacheEntry {
            content_hash: content_hash(job_id, stage),
            analysis_version: cache_key,
            result: data,
            created_at: now,
            access_count: 0,
            last_accessed: now,
            size_bytes: 0,
        };
        self.storage.cache_set(&entry).await?;
        Ok(())
    }

    pub async fn load_checkpoint(&self, job_id: Uuid, stage: StageId, cache_key: &str) -> Result<Option<serde_json::Value>> {
        let entry = self.storage.cache_get(&content_hash(job_id, stage), cache_key).await?;
        Ok(entry.map(|e| e.result))
    }

    /// Every stage in `StageId::ORDER` that already has a checkpoint for
    /// `job_id` under the workspace's current cache keys.
    pub async fn completed_stages(&self, job_id: Uuid, cache_mgr: &CacheKeyManager) -> Result<HashSet<StageId>> {
        let mut completed = HashSet::new();
        for stage in StageId::ORDER {
            let key = cache_mgr.key_for_stage(stage);
            if self.load_checkpoint(job_id, stage, &key).await?.is_some() {
                completed.insert(stage);
            }
        }
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_storage::SqliteStore;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    fn manager() -> CheckpointManager {
        let store = SqliteStore::open_in_memory().unwrap();
        CheckpointManager::new(Arc::new(store))
    }

    #[tokio::test]
    async fn save_and_load_round_trips_checkpoint_data() {
        let mgr = manager();
        let job_id = Uuid::new_v4();
        mgr.save_checkpoint(job_id, StageId::StructuralScan, "scan:/ws:1".into(), json!({"files": 12}), now())
            .await
            .unwrap();

        let loaded = mgr.load_checkpoint(job_id, StageId::StructuralScan, "scan:/ws:1").await.unwrap();
        assert_eq!(loaded, Some(json!({"files": 12})));
    }

    #[tokio::test]
    async fn saving_twice_replaces_the_checkpoint() {
        let mgr = manager();
        let job_id = Uuid::new_v4();
        mgr.save_checkpoint(job_id, StageId::StructuralScan, "scan:/ws:1".into(), json!({"files": 1}), now())
            .await
            .unwrap();
        mgr.save_checkpoint(job_id, StageId::StructuralScan, "scan:/ws:1".into(), json!({"files": 2}), now())
            .await
            .unwrap();

        let loaded = mgr.load_checkpoint(job_id, StageId::StructuralScan, "scan:/ws:1").await.unwrap();
        assert_eq!(loaded, Some(json!({"files": 2})));
    }

    #[tokio::test]
    async fn completed_stages_reflects_only_saved_ones() {
        let mgr = manager();
        let job_id = Uuid::new_v4();
        let cache_mgr = CacheKeyManager::new("/ws", 1);

        mgr.save_checkpoint(
            job_id,
            StageId::StructuralScan,
            cache_mgr.key_for_stage(StageId::StructuralScan),
            json!({}),
            now(),
        )
        .await
        .unwrap();

        let completed = mgr.completed_stages(job_id, &cache_mgr).await.unwrap();
        assert_eq!(completed, HashSet::from([StageId::StructuralScan]));
    }

    #[tokio::test]
    async fn missing_checkpoint_loads_as_none() {
        let mgr = manager();
        let loaded = mgr.load_checkpoint(Uuid::new_v4(), StageId::Verification, "nope").await.unwrap();
        assert_eq!(loaded, None);
    }
}
