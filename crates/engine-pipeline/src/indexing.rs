//! The eight-phase indexing pipeline (spec §4.D): wires `JobStateMachine`,
//! `PipelineDAG`, `CheckpointManager` and `run_concurrent` together over a
//! caller-supplied file list, writing every intermediate and final result
//! through `engine_storage::Storage`.
//!
//! Phases run strictly in order (`PipelineDAG::default_pipeline`); within a
//! phase, per-file work is bounded by `EngineConfig::pipeline.max_concurrent_workers`
//! via `run_concurrent`. A phase already checkpointed for this job is
//! skipped on resume.

use crate::checkpoint::CheckpointManager;
use crate::concurrency::run_concurrent;
use crate::dag::{CacheKeyManager, PipelineDAG};
use crate::error::{PipelineError, Result};
use crate::job::{Job, JobStateMachine, StageId};
use chrono::{DateTime, Utc};
use engine_core::config::EngineConfig;
use engine_core::features::embeddings::{
    extract_dependency, extract_purpose, extract_semantic, extract_structural, extract_usage,
};
use engine_core::features::scan::scan_source;
use engine_core::features::staleness::StalenessTracker;
use engine_core::models::{
    Aspect, CalibrationReport, ConfidenceValue, Edge, EdgeType, EvidenceEntry, EvidenceKind, FileEntity,
    FunctionEntity, MultiVector, Provenance,
};
use engine_core::provider::{ChatMessage, ChatRequest, ChatRole, EmbeddingService, FileSystem, Governor, LlmService};
use engine_storage::Storage;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Summary of one phase's work, checkpointed as `serde_json::Value` under
/// the stage's cache key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct PhaseReport {
    pub files_processed: usize,
    pub items_created: usize,
}

pub struct IndexingPipeline {
    storage: Arc<dyn Storage>,
    fs: Arc<dyn FileSystem>,
    embeddings: Arc<dyn EmbeddingService>,
    llm: Option<Arc<dyn LlmService>>,
    governor: Arc<dyn Governor>,
    config: EngineConfig,
    checkpoints: CheckpointManager,
    dag: PipelineDAG,
    model_id: String,
}

impl IndexingPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        fs: Arc<dyn FileSystem>,
        embeddings: Arc<dyn EmbeddingService>,
        llm: Option<Arc<dyn LlmService>>,
        governor: Arc<dyn Governor>,
        config: EngineConfig,
        model_id: impl Into<String>,
    ) -> Result<Self> {
        let dag = PipelineDAG::default_pipeline()?;
        let checkpoints = CheckpointManager::new(storage.clone());
        Ok(Self {
            storage,
            fs,
            embeddings,
            llm,
            governor,
            config,
            checkpoints,
            dag,
            model_id: model_id.into(),
        })
    }

    fn cache_mgr(&self, job: &Job) -> CacheKeyManager {
        CacheKeyManager::new(job.workspace_root.clone(), self.config.analysis_version)
    }

    /// Runs every not-yet-completed phase for `job` against `files`
    /// (workspace-relative paths), in order, transitioning `job`'s state as
    /// it goes. Returns the completed (or failed) job; failures never panic
    /// the caller, they're recorded in `JobState::Failed`.
    pub async fn run(&self, job: Job, files: Vec<String>, now: DateTime<Utc>) -> Result<Job> {
        let job_id = job.id;
        let cache_mgr = self.cache_mgr(&job);
        let mut sm = JobStateMachine::new(job);
        sm.start(format!("worker-{job_id}"), StageId::StructuralScan, now)?;
        info!("job {job_id}: indexing {} files", files.len());

        let completed = self.checkpoints.completed_stages(job_id, &cache_mgr).await?;

        for group in self.dag.execution_order() {
            for &stage in group {
                if completed.contains(&stage) {
                    info!("job {job_id}: stage {stage} already checkpointed, skipping");
                    continue;
                }
                sm.update_stage(stage, now)?;
                let outcome = self.run_stage(stage, job_id, &files, now).await;
                match outcome {
                    Ok(report) => {
                        info!("job {job_id}: stage {stage} processed {} files", report.files_processed);
                        let key = cache_mgr.key_for_stage(stage);
                        self.checkpoints
                            .save_checkpoint(job_id, stage, key, serde_json::to_value(&report).unwrap(), now)
                            .await?;
                    }
                    Err(e) => {
                        error!("job {job_id}: stage {stage} failed: {e}");
                        let category = e.category();
                        sm.fail(e.to_string(), category, stage, 0, now)?;
                        return Ok(sm.into_job());
                    }
                }
            }
        }

        let total_files = files.len();
        sm.complete(total_files, now)?;
        info!("job {job_id}: completed");
        Ok(sm.into_job())
    }

    async fn run_stage(&self, stage: StageId, job_id: uuid::Uuid, files: &[String], now: DateTime<Utc>) -> Result<PhaseReport> {
        match stage {
            StageId::StructuralScan => self.structural_scan(files, now).await,
            StageId::SymbolExtraction => self.symbol_extraction(files, now).await,
            StageId::RelationshipDiscovery => self.relationship_discovery(files, now).await,
            StageId::EmbeddingGeneration => self.embedding_generation(files, now).await,
            StageId::Summarization => self.summarization(files, now).await,
            StageId::ContextPackGeneration => self.context_pack_generation(files, now).await,
            StageId::CalibrationSeed => self.calibration_seed(job_id, now).await,
            StageId::Verification => self.verification(files).await,
        }
    }

    async fn structural_scan(&self, files: &[String], now: DateTime<Utc>) -> Result<PhaseReport> {
        let staleness_config = self.config.staleness.clone();
        let storage = self.storage.clone();
        let fs = self.fs.clone();
        let max_workers = self.config.pipeline.max_concurrent_workers;

        let paths = files.to_vec();
        let count = run_concurrent(paths, max_workers, move |path| {
            let storage = storage.clone();
            let fs = fs.clone();
            let staleness_config = staleness_config.clone();
            async move {
                let normalized = FileEntity::normalize_path(&path);
                let modified = fs
                    .modified_unix_ms(Path::new(&normalized))
                    .ok()
                    .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms));

                let tracker = StalenessTracker::new(staleness_config);
                let classified = tracker.classify(&normalized, modified, now);

                let checksum = fs
                    .read_to_string(Path::new(&normalized))
                    .map(|content| {
                        use sha2::{Digest, Sha256};
                        let digest = Sha256::digest(content.as_bytes());
                        hex::encode(digest)[..16].to_string()
                    })
                    .unwrap_or_default();

                let entity = FileEntity {
                    path: normalized,
                    category: engine_core::models::FileCategory::Code,
                    checksum,
                    last_indexed: Some(now),
                    last_modified: modified.unwrap_or(now),
                    durability: classified.durability,
                };
                storage.upsert_file(&entity).await.map_err(PipelineError::from)
            }
        })
        .await?;

        Ok(PhaseReport { files_processed: count, items_created: count })
    }

    async fn symbol_extraction(&self, files: &[String], _now: DateTime<Utc>) -> Result<PhaseReport> {
        let storage = self.storage.clone();
        let fs = self.fs.clone();

        let mut created = 0usize;
        let paths = files.to_vec();
        for path in &paths {
            let normalized = FileEntity::normalize_path(path);
            let Ok(content) = fs.read_to_string(Path::new(&normalized)) else {
                continue;
            };
            let scan = scan_source(&normalized, &content);
            for (idx, signature) in scan.signatures.iter().enumerate() {
                let name = scan.exports.get(idx).cloned().unwrap_or_else(|| format!("symbol_{idx}"));
                let function = FunctionEntity {
                    id: format!("{normalized}:{name}"),
                    file_path: normalized.clone(),
                    name,
                    start_line: 0,
                    end_line: 0,
                    signature: signature.clone(),
                    purpose: None,
                    confidence: 0.5,
                    access_count: 0,
                    success_count: 0,
                    failure_count: 0,
                };
                storage.upsert_function(&function).await?;
                created += 1;
            }
        }
        Ok(PhaseReport { files_processed: paths.len(), items_created: created })
    }

    async fn relationship_discovery(&self, files: &[String], now: DateTime<Utc>) -> Result<PhaseReport> {
        let storage = self.storage.clone();
        let fs = self.fs.clone();

        let mut created = 0usize;
        for path in files {
            let normalized = FileEntity::normalize_path(path);
            let Ok(content) = fs.read_to_string(Path::new(&normalized)) else {
                continue;
            };
            let scan = scan_source(&normalized, &content);
            for import in &scan.dependency.imports {
                let edge = Edge::new(
                    normalized.clone(),
                    import.path.clone(),
                    EdgeType::Imports,
                    normalized.clone(),
                    1.0,
                    ConfidenceValue::deterministic_true("structural_scan"),
                    now,
                );
                // An import naming a file we never scanned (a package, or a
                // path outside this job's file list) can't be inserted as an
                // edge endpoint; skip it rather than failing the whole phase.
                match storage.insert_edge(&edge).await {
                    Ok(()) => created += 1,
                    Err(e) => warn!("skipping unresolvable import {normalized} -> {}: {e}", import.path),
                }
            }
        }
        Ok(PhaseReport { files_processed: files.len(), items_created: created })
    }

    async fn embedding_generation(&self, files: &[String], now: DateTime<Utc>) -> Result<PhaseReport> {
        self.governor.check_budget()?;

        let storage = self.storage.clone();
        let fs = self.fs.clone();
        let embeddings = self.embeddings.clone();
        let model_id = self.model_id.clone();
        let max_workers = self.config.pipeline.max_concurrent_workers;

        let paths = files.to_vec();
        let count = run_concurrent(paths, max_workers, move |path| {
            let storage = storage.clone();
            let fs = fs.clone();
            let embeddings = embeddings.clone();
            let model_id = model_id.clone();
            async move {
                let normalized = FileEntity::normalize_path(&path);
                let Ok(content) = fs.read_to_string(Path::new(&normalized)) else {
                    return Ok(());
                };
                let scan = scan_source(&normalized, &content);

                let purpose = extract_purpose(None, &normalized).unwrap_or_else(|_| normalized.clone());
                let semantic = extract_semantic(&purpose, None, &scan.exports, &content);
                let structural = extract_structural(&scan.structural);
                let dependency = extract_dependency(&scan.dependency);
                let usage = extract_usage(&scan.exports, &scan.signatures);

                let mut mv = MultiVector::new(normalized.clone(), model_id.clone(), now);
                for (aspect, input) in [
                    (Aspect::Purpose, purpose),
                    (Aspect::Semantic, semantic),
                    (Aspect::Structural, structural),
                    (Aspect::Dependency, dependency),
                    (Aspect::Usage, usage),
                ] {
                    let vector = embeddings.embed(&input, &model_id).await.map_err(PipelineError::from)?;
                    mv.set_aspect(aspect, vector, input);
                }

                storage.upsert_embedding(&mv).await.map_err(PipelineError::from)
            }
        })
        .await?;

        Ok(PhaseReport { files_processed: count, items_created: count })
    }

    async fn summarization(&self, files: &[String], now: DateTime<Utc>) -> Result<PhaseReport> {
        let Some(llm) = &self.llm else {
            return Err(PipelineError::from(engine_core::CoreError::provider_unavailable(
                "no LLM service configured for summarization",
            )));
        };

        let storage = self.storage.clone();
        let mut summarized = 0usize;
        for (idx, path) in files.iter().enumerate() {
            self.governor.check_budget()?;
            let normalized = FileEntity::normalize_path(path);
            let request = ChatRequest {
                provider: "default".to_string(),
                model_id: self.model_id.clone(),
                messages: vec![
                    ChatMessage { role: ChatRole::System, content: "Summarize this file's purpose in one sentence.".to_string() },
                    ChatMessage { role: ChatRole::User, content: normalized.clone() },
                ],
            };
            let response = llm.chat(request, self.governor.as_ref()).await?;

            let entry = EvidenceEntry {
                id: idx as u64 + 1,
                kind: EvidenceKind::Claim,
                payload: serde_json::json!({ "file": normalized, "summary": response.content }),
                provenance: Provenance { source: normalized.clone(), method: "llm_summarization".to_string() },
                timestamp: now,
                related_entries: vec![],
                confidence: ConfidenceValue::Derived { value: 0.6, inputs: vec![normalized.clone()] },
            };
            storage.append_evidence(&entry).await?;
            summarized += 1;
        }
        Ok(PhaseReport { files_processed: files.len(), items_created: summarized })
    }

    async fn context_pack_generation(&self, files: &[String], now: DateTime<Utc>) -> Result<PhaseReport> {
        let storage = self.storage.clone();
        let mut created = 0usize;
        for path in files {
            let normalized = FileEntity::normalize_path(path);
            let mut pack = engine_core::models::ContextPack::new(
                engine_core::models::PackType::ModuleContext,
                normalized.clone(),
                format!("Context for {normalized}"),
                0.5,
            );
            pack.invalidation_triggers.push(normalized.clone());
            storage.upsert_context_pack(&pack, None).await?;
            let _ = now;
            created += 1;
        }
        Ok(PhaseReport { files_processed: files.len(), items_created: created })
    }

    async fn calibration_seed(&self, _job_id: uuid::Uuid, now: DateTime<Utc>) -> Result<PhaseReport> {
        let report = CalibrationReport::skeleton(now);
        self.storage.save_calibration_report(&report).await?;
        Ok(PhaseReport { files_processed: 0, items_created: 1 })
    }

    async fn verification(&self, files: &[String]) -> Result<PhaseReport> {
        let mut verified = 0usize;
        for path in files {
            let normalized = FileEntity::normalize_path(path);
            let present = self.storage.get_file(&normalized).await?.is_some();
            if !present {
                return Err(PipelineError::StageExecutionFailed {
                    stage: StageId::Verification.to_string(),
                    message: format!("file {normalized} missing from store after indexing"),
                });
            }
            verified += 1;
        }
        Ok(PhaseReport { files_processed: verified, items_created: verified })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_storage::SqliteStore;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    struct FakeFs {
        files: HashMap<String, String>,
    }

    impl FileSystem for FakeFs {
        fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            self.files
                .get(&path.to_string_lossy().to_string())
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
        }

        fn modified_unix_ms(&self, _path: &Path) -> std::io::Result<i64> {
            Ok(now().timestamp_millis())
        }
    }

    struct FakeEmbeddings;

    #[async_trait::async_trait]
    impl EmbeddingService for FakeEmbeddings {
        async fn embed(&self, text: &str, _model_id: &str) -> engine_core::Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 0.0, 0.0])
        }

        fn dimension(&self, _model_id: &str) -> Option<usize> {
            Some(3)
        }
    }

    struct FakeGovernor {
        remaining: Mutex<u64>,
    }

    impl Governor for FakeGovernor {
        fn check_budget(&self) -> engine_core::Result<()> {
            if *self.remaining.lock().unwrap() == 0 {
                return Err(engine_core::CoreError::budget_exhausted("no tokens left"));
            }
            Ok(())
        }

        fn record_spend(&self, tokens: u64) {
            let mut remaining = self.remaining.lock().unwrap();
            *remaining = remaining.saturating_sub(tokens);
        }

        fn remaining_tokens(&self) -> u64 {
            *self.remaining.lock().unwrap()
        }
    }

    fn pipeline_with(llm: Option<Arc<dyn LlmService>>) -> IndexingPipeline {
        let storage: Arc<dyn Storage> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let fs: Arc<dyn FileSystem> = Arc::new(FakeFs {
            files: HashMap::from([("src/lib.rs".to_string(), "pub fn run() {}".to_string())]),
        });
        let embeddings: Arc<dyn EmbeddingService> = Arc::new(FakeEmbeddings);
        let governor: Arc<dyn Governor> = Arc::new(FakeGovernor { remaining: Mutex::new(10_000) });
        IndexingPipeline::new(storage, fs, embeddings, llm, governor, EngineConfig::default(), "test-model").unwrap()
    }

    #[tokio::test]
    async fn full_run_without_llm_fails_at_summarization() {
        let pipeline = pipeline_with(None);
        let job = Job::new_queued("/ws", 0, now());
        let result = pipeline.run(job, vec!["src/lib.rs".to_string()], now()).await.unwrap();
        match result.state {
            crate::job::JobState::Failed { failed_stage, .. } => {
                assert_eq!(failed_stage, StageId::Summarization);
            }
            other => panic!("expected Failed at summarization, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn structural_scan_persists_a_file_entity() {
        let pipeline = pipeline_with(None);
        let report = pipeline.structural_scan(&["src/lib.rs".to_string()], now()).await.unwrap();
        assert_eq!(report.files_processed, 1);

        let stored = pipeline.storage.get_file("src/lib.rs").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn resume_skips_stages_already_checkpointed() {
        let pipeline = pipeline_with(None);
        let job = Job::new_queued("/ws", 0, now());
        let job_id = job.id;
        let cache_mgr = pipeline.cache_mgr(&job);

        pipeline
            .checkpoints
            .save_checkpoint(
                job_id,
                StageId::StructuralScan,
                cache_mgr.key_for_stage(StageId::StructuralScan),
                serde_json::json!({"files_processed": 1, "items_created": 1}),
                now(),
            )
            .await
            .unwrap();

        let mut sm = JobStateMachine::new(job);
        sm.start("worker-test".into(), StageId::StructuralScan, now()).unwrap();
        let job = sm.into_job();

        // Re-running should not error even though the file doesn't actually
        // exist for a fresh structural scan, because that stage is skipped.
        let completed = pipeline.checkpoints.completed_stages(job_id, &cache_mgr).await.unwrap();
        assert!(completed.contains(&StageId::StructuralScan));
        let _ = job;
    }
}
