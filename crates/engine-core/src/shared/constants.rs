//! Centralized defaults for every tunable named in spec §6's configuration
//! table. `config::EngineConfig` uses these as its `Default` values; nothing
//! here is load-bearing logic, just the numbers a reimplementation needs to
//! agree on.

/// Content cache (4.A) defaults.
pub mod content_cache {
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
    pub const DEFAULT_MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;
    /// Fraction of entries evicted once a soft cap is exceeded.
    pub const EVICTION_FRACTION_LOW: f64 = 0.10;
    pub const EVICTION_FRACTION_HIGH: f64 = 0.20;
}

/// Staleness tracker (4.C) defaults.
pub mod staleness {
    pub const DEFAULT_VOLATILE_THRESHOLD_MINUTES: i64 = 30;
    pub const DEFAULT_STABLE_THRESHOLD_HOURS: i64 = 24;
    pub const PRIORITY_VOLATILE: i32 = 10;
    pub const PRIORITY_STABLE: i32 = 1;
    pub const PRIORITY_IMMUTABLE: i32 = 0;
}

/// Graph metrics (4.F) defaults.
pub mod graph_metrics {
    pub const PAGERANK_DAMPING: f64 = 0.85;
    pub const PAGERANK_MAX_ITERATIONS: usize = 100;
    pub const PAGERANK_CONVERGENCE: f64 = 1e-6;
    pub const DEFAULT_WEIGHT_CODE: f64 = 0.30;
    pub const DEFAULT_WEIGHT_RATIONALE: f64 = 0.20;
    pub const DEFAULT_WEIGHT_EPISTEMIC: f64 = 0.25;
    pub const DEFAULT_WEIGHT_ORG: f64 = 0.10;
    pub const DEFAULT_WEIGHT_CROSS_GRAPH: f64 = 0.15;
}

/// Retrieval engine (4.G) defaults.
pub mod retrieval {
    pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.60;
    pub const DEFAULT_KEYWORD_WEIGHT: f64 = 0.30;
    pub const DEFAULT_STRUCTURAL_WEIGHT: f64 = 0.10;
    pub const MAX_STRUCTURAL_BOOST: f64 = 0.50;
    pub const DEFAULT_MAX_PACKS_L1: usize = 6;
    pub const EVAL_CORPUS_PENALTY: f64 = 0.1;
}

/// Query pipeline / sessions (4.H) defaults.
pub mod sessions {
    pub const DEFAULT_SESSION_TTL_MS: i64 = 30 * 60 * 1000;
    pub const DEFAULT_MAX_SESSIONS: usize = 64;
    pub const DEFAULT_MAX_PACKS_PER_SESSION: usize = 50;
    pub const SCENARIO_LIST_CAP: usize = 6;
}

/// Epistemic layer (4.J) defaults.
pub mod epistemic {
    pub const SUPPORT_GRAPH_DAMPING: f64 = 0.5;
    pub const SUPPORT_GRAPH_MAX_DEPTH: usize = 10;
    pub const CALIBRATION_BUCKETS: usize = 10;
    pub const DEFAULT_MIN_PREDICTIONS_FOR_REPORT: usize = 10;
    pub const TREND_IMPROVING_DELTA: f64 = 0.02;
    pub const TREND_DEGRADING_DELTA: f64 = -0.02;
}

/// Feedback loop (4.I) defaults.
pub mod feedback {
    pub const MIN_SAMPLES: u32 = 3;
    pub const NEUTRAL_SCORE: f64 = 0.5;
    pub const KNOWLEDGE_CAUSED_THRESHOLD: f64 = 0.4;
    pub const SUSPICIOUS_THRESHOLD: f64 = 0.2;
}

/// Quality targets (§6 `targets.*`).
pub mod targets {
    pub const DEFAULT_RECALL_AT_5: f64 = 0.7;
    pub const DEFAULT_NDCG_AT_5: f64 = 0.6;
    pub const DEFAULT_MRR: f64 = 0.5;
    /// Cutoff for recall/nDCG (4.K): top-5 results.
    pub const K: usize = 5;
}

/// Transaction retry policy (4.B).
pub mod store {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
}
