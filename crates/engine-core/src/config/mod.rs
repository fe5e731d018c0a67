//! `EngineConfig`: every tunable enumerated in the external-interfaces
//! configuration table, in one validated struct.
//!
//! # Examples
//!
//! ```rust,ignore
//! use engine_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! config.validate()?;
//! ```

pub mod error;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use validation::Validatable;

use crate::shared::constants::{content_cache, epistemic, feedback, graph_metrics, retrieval, sessions, staleness, store, targets};
use serde::{Deserialize, Serialize};
use validation::{check_range, check_weights_normalized};

/// Content-cache eviction policy (4.A).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentCacheConfig {
    pub max_entries: usize,
    pub max_size_bytes: u64,
    pub ttl_ms: Option<i64>,
}

impl Default for ContentCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: content_cache::DEFAULT_MAX_ENTRIES,
            max_size_bytes: content_cache::DEFAULT_MAX_SIZE_BYTES,
            ttl_ms: None,
        }
    }
}

impl Validatable for ContentCacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "content_cache.max_entries",
            self.max_entries as f64,
            1.0,
            10_000_000.0,
            "must hold at least one entry",
        )?;
        check_range(
            "content_cache.max_size_bytes",
            self.max_size_bytes as f64,
            1024.0,
            u64::MAX as f64,
            "must allow at least 1 KiB",
        )?;
        if let Some(ttl) = self.ttl_ms {
            check_range("content_cache.ttl_ms", ttl as f64, 1.0, i64::MAX as f64, "must be positive when set")?;
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ContentCacheConfig"
    }
}

/// Staleness classification thresholds (4.C).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessConfig {
    pub volatile_threshold_minutes: i64,
    pub stable_threshold_hours: i64,
    pub immutable_patterns: Vec<String>,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            volatile_threshold_minutes: staleness::DEFAULT_VOLATILE_THRESHOLD_MINUTES,
            stable_threshold_hours: staleness::DEFAULT_STABLE_THRESHOLD_HOURS,
            immutable_patterns: vec![
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
                "**/vendor/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
                "**/*.lock".to_string(),
                "**/target/**".to_string(),
                "**/__pycache__/**".to_string(),
            ],
        }
    }
}

impl Validatable for StalenessConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "staleness.volatile_threshold_minutes",
            self.volatile_threshold_minutes as f64,
            1.0,
            10_080.0,
            "one minute to one week",
        )?;
        check_range(
            "staleness.stable_threshold_hours",
            self.stable_threshold_hours as f64,
            1.0,
            8_760.0,
            "one hour to one year",
        )?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "StalenessConfig"
    }
}

/// Indexing pipeline worker pool (4.D, §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineWorkerConfig {
    pub max_concurrent_workers: usize,
}

impl Default for PipelineWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_workers: num_cpus::get().max(1),
        }
    }
}

impl Validatable for PipelineWorkerConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "pipeline.max_concurrent_workers",
            self.max_concurrent_workers as f64,
            1.0,
            4096.0,
            "at least one worker",
        )
    }

    fn config_name(&self) -> &'static str {
        "PipelineWorkerConfig"
    }
}

/// Session manager limits (4.H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub session_ttl_ms: i64,
    pub max_sessions: usize,
    pub max_packs_per_session: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_ms: sessions::DEFAULT_SESSION_TTL_MS,
            max_sessions: sessions::DEFAULT_MAX_SESSIONS,
            max_packs_per_session: sessions::DEFAULT_MAX_PACKS_PER_SESSION,
        }
    }
}

impl Validatable for SessionConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range("sessions.session_ttl_ms", self.session_ttl_ms as f64, 1_000.0, i64::MAX as f64, "at least one second")?;
        check_range("sessions.max_sessions", self.max_sessions as f64, 1.0, 1_000_000.0, "at least one session")?;
        check_range(
            "sessions.max_packs_per_session",
            self.max_packs_per_session as f64,
            1.0,
            100_000.0,
            "at least one pack",
        )?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SessionConfig"
    }
}

/// Unified importance sub-score weights (4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceWeights {
    pub code: f64,
    pub rationale: f64,
    pub epistemic: f64,
    pub org: f64,
    pub cross_graph: f64,
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            code: graph_metrics::DEFAULT_WEIGHT_CODE,
            rationale: graph_metrics::DEFAULT_WEIGHT_RATIONALE,
            epistemic: graph_metrics::DEFAULT_WEIGHT_EPISTEMIC,
            org: graph_metrics::DEFAULT_WEIGHT_ORG,
            cross_graph: graph_metrics::DEFAULT_WEIGHT_CROSS_GRAPH,
        }
    }
}

impl Validatable for ImportanceWeights {
    fn validate(&self) -> ConfigResult<()> {
        check_weights_normalized(
            "importance_weights",
            &[
                ("code", self.code),
                ("rationale", self.rationale),
                ("epistemic", self.epistemic),
                ("org", self.org),
                ("cross_graph", self.cross_graph),
            ],
            "code + rationale + epistemic + org + cross_graph must total 1.0",
        )
    }

    fn config_name(&self) -> &'static str {
        "ImportanceWeights"
    }
}

/// Flag thresholds derived from the unified importance sub-scores (4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceThresholds {
    pub load_bearing: f64,
    pub foundational: f64,
    pub at_risk: f64,
    pub needs_validation: f64,
    pub truck_factor: f64,
    pub hotspot: f64,
}

impl Default for ImportanceThresholds {
    fn default() -> Self {
        Self {
            load_bearing: 0.7,
            foundational: 0.75,
            at_risk: 0.6,
            needs_validation: 0.4,
            truck_factor: 0.65,
            hotspot: 0.6,
        }
    }
}

impl Validatable for ImportanceThresholds {
    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("load_bearing", self.load_bearing),
            ("foundational", self.foundational),
            ("at_risk", self.at_risk),
            ("needs_validation", self.needs_validation),
            ("truck_factor", self.truck_factor),
            ("hotspot", self.hotspot),
        ] {
            check_range(&format!("importance_thresholds.{field}"), value, 0.0, 1.0, "thresholds are probabilities")?;
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ImportanceThresholds"
    }
}

/// Hybrid retrieval scoring weights (4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalWeights {
    pub semantic_weight: f64,
    pub keyword_weight: f64,
    pub structural_weight: f64,
    pub max_packs_per_depth: usize,
}

impl Default for RetrievalWeights {
    fn default() -> Self {
        Self {
            semantic_weight: retrieval::DEFAULT_SEMANTIC_WEIGHT,
            keyword_weight: retrieval::DEFAULT_KEYWORD_WEIGHT,
            structural_weight: retrieval::DEFAULT_STRUCTURAL_WEIGHT,
            max_packs_per_depth: retrieval::DEFAULT_MAX_PACKS_L1,
        }
    }
}

impl Validatable for RetrievalWeights {
    fn validate(&self) -> ConfigResult<()> {
        check_weights_normalized(
            "retrieval_weights",
            &[
                ("semantic", self.semantic_weight),
                ("keyword", self.keyword_weight),
                ("structural", self.structural_weight),
            ],
            "semantic + keyword + structural must total 1.0",
        )?;
        check_range(
            "retrieval.max_packs_per_depth",
            self.max_packs_per_depth as f64,
            1.0,
            1000.0,
            "at least one pack",
        )?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "RetrievalWeights"
    }
}

/// Compliance pass/fail targets (§6 `targets.*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityTargets {
    pub recall_at_5: f64,
    pub ndcg_at_5: f64,
    pub mrr: f64,
    pub min_predictions_for_calibration_report: usize,
}

impl Default for QualityTargets {
    fn default() -> Self {
        Self {
            recall_at_5: targets::DEFAULT_RECALL_AT_5,
            ndcg_at_5: targets::DEFAULT_NDCG_AT_5,
            mrr: targets::DEFAULT_MRR,
            min_predictions_for_calibration_report: epistemic::DEFAULT_MIN_PREDICTIONS_FOR_REPORT,
        }
    }
}

impl Validatable for QualityTargets {
    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [("recall_at_5", self.recall_at_5), ("ndcg_at_5", self.ndcg_at_5), ("mrr", self.mrr)] {
            check_range(&format!("targets.{field}"), value, 0.0, 1.0, "targets are probabilities")?;
        }
        check_range(
            "targets.min_predictions_for_calibration_report",
            self.min_predictions_for_calibration_report as f64,
            1.0,
            1_000_000.0,
            "need at least one prediction",
        )?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "QualityTargets"
    }
}

/// Store transaction retry policy (4.B).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_retries: store::DEFAULT_MAX_RETRIES,
        }
    }
}

impl Validatable for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range("store.max_retries", self.max_retries as f64, 0.0, 100.0, "bounded retry count")
    }

    fn config_name(&self) -> &'static str {
        "StoreConfig"
    }
}

/// Feedback-loop / SBFL thresholds (4.I).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    pub min_samples: u32,
    pub knowledge_caused_threshold: f64,
    pub suspicious_threshold: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            min_samples: feedback::MIN_SAMPLES,
            knowledge_caused_threshold: feedback::KNOWLEDGE_CAUSED_THRESHOLD,
            suspicious_threshold: feedback::SUSPICIOUS_THRESHOLD,
        }
    }
}

impl Validatable for FeedbackConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range("feedback.min_samples", self.min_samples as f64, 1.0, 10_000.0, "at least one sample")?;
        check_range(
            "feedback.knowledge_caused_threshold",
            self.knowledge_caused_threshold,
            0.0,
            1.0,
            "SBFL scores are in [0,1]",
        )?;
        check_range("feedback.suspicious_threshold", self.suspicious_threshold, 0.0, 1.0, "SBFL scores are in [0,1]")?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "FeedbackConfig"
    }
}

/// The complete, enumerated configuration surface. Bumping `analysis_version`
/// invalidates the content cache namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub analysis_version: u32,
    pub content_cache: ContentCacheConfig,
    pub staleness: StalenessConfig,
    pub pipeline: PipelineWorkerConfig,
    pub sessions: SessionConfig,
    pub importance_weights: ImportanceWeights,
    pub importance_thresholds: ImportanceThresholds,
    pub retrieval: RetrievalWeights,
    pub targets: QualityTargets,
    pub store: StoreConfig,
    pub feedback: FeedbackConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analysis_version: 1,
            content_cache: ContentCacheConfig::default(),
            staleness: StalenessConfig::default(),
            pipeline: PipelineWorkerConfig::default(),
            sessions: SessionConfig::default(),
            importance_weights: ImportanceWeights::default(),
            importance_thresholds: ImportanceThresholds::default(),
            retrieval: RetrievalWeights::default(),
            targets: QualityTargets::default(),
            store: StoreConfig::default(),
            feedback: FeedbackConfig::default(),
        }
    }
}

impl Validatable for EngineConfig {
    /// Validates every substructure; the first failure wins (fields are
    /// checked in declaration order).
    fn validate(&self) -> ConfigResult<()> {
        self.content_cache.validate()?;
        self.staleness.validate()?;
        self.pipeline.validate()?;
        self.sessions.validate()?;
        self.importance_weights.validate()?;
        self.importance_thresholds.validate()?;
        self.retrieval.validate()?;
        self.targets.validate()?;
        self.store.validate()?;
        self.feedback.validate()?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "EngineConfig"
    }
}
