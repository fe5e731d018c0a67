//! Query pipeline orchestrator (spec §4.H): runs the four-stage retrieval
//! pipeline (`semantic_retrieval -> direct_packs -> graph_expansion ->
//! synthesis`) over a caller-supplied candidate set, combining
//! `engine_core::features::retrieval` scoring with `StageTracker` status
//! reporting and, for follow-ups, the session manager's concurrency
//! contract.

use crate::error::Result;
use crate::guidance::{build_guidance, GuidanceReport};
use crate::session::SessionManager;
use crate::stage_tracker::{StageReport, StageTracker};
use chrono::{DateTime, Utc};
use engine_core::config::RetrievalWeights;
use engine_core::features::embeddings::{compute_multi_vector_similarity, QueryType};
use engine_core::features::retrieval::{
    expand_query, hybrid_score, keyword_score, rank_packs, Depth, HybridInputs, KeywordCandidate, RankedPack, TaskType,
};
use engine_core::models::{Aspect, ContextPack, MultiVector};
use engine_core::provider::EmbeddingService;
use engine_storage::Storage;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// One retrievable unit offered to the query pipeline: a persisted pack plus
/// the raw signals needed to score it (its embedding, its keyword surface,
/// and the target ids it imports, for the structural boost).
#[derive(Debug, Clone)]
pub struct PackCandidate {
    pub pack: ContextPack,
    pub module_name: String,
    pub symbol_names: Vec<String>,
    pub content: String,
    pub vector: Option<MultiVector>,
    pub imports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    pub ranked: Vec<RankedPack>,
    pub average_score: f64,
    pub stage_reports: Vec<StageReport>,
    pub guidance: GuidanceReport,
}

const ANCHOR_COUNT: usize = 5;

pub struct QueryPipeline {
    storage: Arc<dyn Storage>,
    embeddings: Arc<dyn EmbeddingService>,
    sessions: Arc<SessionManager>,
    weights: RetrievalWeights,
    model_id: String,
}

impl QueryPipeline {
    pub fn new(storage: Arc<dyn Storage>, embeddings: Arc<dyn EmbeddingService>, sessions: Arc<SessionManager>, weights: RetrievalWeights, model_id: impl Into<String>) -> Self {
        Self { storage, embeddings, sessions, weights, model_id: model_id.into() }
    }

    pub fn start_session(&self, now: DateTime<Utc>) -> Result<Uuid> {
        self.sessions.start(now)
    }

    /// Runs one query against `candidates`, outside any session.
    pub async fn run(&self, query: &str, task: TaskType, depth: Depth, candidates: Vec<PackCandidate>, now: DateTime<Utc>) -> Result<QueryResult> {
        info!("running query {query:?} over {} candidates", candidates.len());
        let mut tracker = StageTracker::new();
        let expanded = expand_query(query);

        let semantic_scores = self.semantic_retrieval(&expanded, &candidates, now, &mut tracker).await;
        let direct_targets = self.direct_packs(query, &candidates, &mut tracker);
        let (shares_import, shares_module) = self
            .graph_expansion(&semantic_scores, &direct_targets, &candidates, &mut tracker)
            .await;

        let result = self.synthesis(&expanded, task, depth, candidates, &semantic_scores, &shares_import, &shares_module, &mut tracker);

        Ok(result)
    }

    /// Runs a follow-up inside `session_id`: the session manager serializes
    /// this against any other follow-up on the same session and only
    /// commits the returned pack ids on success (spec §4.H).
    pub async fn run_follow_up(&self, session_id: Uuid, query: &str, task: TaskType, depth: Depth, candidates: Vec<PackCandidate>, now: DateTime<Utc>) -> Result<Vec<Uuid>> {
        let sessions = self.sessions.clone();
        let pipeline_result = self.run(query, task, depth, candidates, now).await?;
        let pack_ids: Vec<Uuid> = pipeline_result.ranked.iter().map(|r| r.pack_id).collect();
        sessions
            .follow_up(session_id, query, now, move |_session| {
                let pack_ids = pack_ids.clone();
                async move { Ok(pack_ids) }
            })
            .await
    }

    async fn semantic_retrieval(&self, expanded_query: &str, candidates: &[PackCandidate], now: DateTime<Utc>, tracker: &mut StageTracker) -> HashMap<String, f64> {
        tracker.start("semantic_retrieval", candidates.len());

        let mut scores = HashMap::new();
        match self.embeddings.embed(expanded_query, &self.model_id).await {
            Ok(vector) => {
                let mut query_vector = MultiVector::new("query", self.model_id.clone(), now);
                query_vector.set_aspect(Aspect::Semantic, vector, expanded_query.to_string());

                for candidate in candidates {
                    if let Some(candidate_vector) = &candidate.vector {
                        let similarity = compute_multi_vector_similarity(&query_vector, candidate_vector, QueryType::SemanticQuery);
                        scores.insert(candidate.pack.target_id.clone(), similarity.total);
                    }
                }
            }
            Err(e) => {
                warn!("semantic_retrieval: embedding failed: {e}");
                tracker.queue_issue("semantic_retrieval", e.to_string());
            }
        }

        let filtered = candidates.len().saturating_sub(scores.len());
        tracker.finish("semantic_retrieval", scores.len(), filtered);
        scores
    }

    /// Exact target-id hits: a query that literally names `path[:symbol]`.
    fn direct_packs(&self, query: &str, candidates: &[PackCandidate], tracker: &mut StageTracker) -> HashSet<String> {
        tracker.start("direct_packs", candidates.len());
        let trimmed = query.trim();
        let hits: HashSet<String> = candidates
            .iter()
            .filter(|c| c.pack.target_id == trimmed)
            .map(|c| c.pack.target_id.clone())
            .collect();
        tracker.finish("direct_packs", hits.len(), 0);
        hits
    }

    /// Walks `get_edges_from` for the top semantic and direct-hit anchors to
    /// find candidates that import or are imported by them, and candidates
    /// sharing a module with an anchor.
    async fn graph_expansion(
        &self,
        semantic_scores: &HashMap<String, f64>,
        direct_targets: &HashSet<String>,
        candidates: &[PackCandidate],
        tracker: &mut StageTracker,
    ) -> (HashSet<String>, HashSet<String>) {
        tracker.start("graph_expansion", candidates.len());

        let mut ranked_anchors: Vec<(&String, &f64)> = semantic_scores.iter().collect();
        ranked_anchors.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
        let anchors: HashSet<String> = ranked_anchors
            .into_iter()
            .take(ANCHOR_COUNT)
            .map(|(target, _)| target.clone())
            .chain(direct_targets.iter().cloned())
            .collect();

        let anchor_modules: HashSet<String> = candidates
            .iter()
            .filter(|c| anchors.contains(&c.pack.target_id))
            .map(|c| c.module_name.clone())
            .collect();

        let mut imported_by_anchor: HashSet<String> = HashSet::new();
        let mut issues = 0usize;
        for anchor in &anchors {
            match self.storage.get_edges_from(anchor).await {
                Ok(edges) => {
                    for edge in edges {
                        imported_by_anchor.insert(edge.to_id);
                    }
                }
                Err(e) => {
                    tracker.queue_issue("graph_expansion", e.to_string());
                    issues += 1;
                }
            }
        }

        let shares_import: HashSet<String> = candidates
            .iter()
            .filter(|c| imported_by_anchor.contains(&c.pack.target_id) || c.imports.iter().any(|i| anchors.contains(i)))
            .map(|c| c.pack.target_id.clone())
            .collect();

        let shares_module: HashSet<String> = candidates
            .iter()
            .filter(|c| anchor_modules.contains(&c.module_name))
            .map(|c| c.pack.target_id.clone())
            .collect();

        tracker.finish("graph_expansion", imported_by_anchor.len(), issues);
        (shares_import, shares_module)
    }

    fn synthesis(
        &self,
        expanded_query: &str,
        task: TaskType,
        depth: Depth,
        candidates: Vec<PackCandidate>,
        semantic_scores: &HashMap<String, f64>,
        shares_import: &HashSet<String>,
        shares_module: &HashSet<String>,
        tracker: &mut StageTracker,
    ) -> QueryResult {
        tracker.start("synthesis", candidates.len());

        let mut score_by_target = HashMap::new();
        for candidate in &candidates {
            let keyword_candidate = KeywordCandidate {
                filename: &candidate.pack.target_id,
                module_name: &candidate.module_name,
                symbol_names: &candidate.symbol_names,
                content: &candidate.content,
            };
            let inputs = HybridInputs {
                semantic_score: semantic_scores.get(&candidate.pack.target_id).copied().unwrap_or(0.0),
                keyword_score: keyword_score(expanded_query, &keyword_candidate),
                shares_import: shares_import.contains(&candidate.pack.target_id),
                shares_module: shares_module.contains(&candidate.pack.target_id),
            };
            score_by_target.insert(candidate.pack.target_id.clone(), hybrid_score(&inputs, &self.weights));
        }

        let related_files: Vec<String> = candidates.iter().flat_map(|c| c.pack.related_files.clone()).collect();
        let packs: Vec<ContextPack> = candidates.into_iter().map(|c| c.pack).collect();
        let (ranked, average_score) = rank_packs(&packs, &score_by_target, depth, task, self.weights.max_packs_per_depth);

        tracker.finish("synthesis", ranked.len(), 0);

        let guidance = build_guidance(expanded_query, task, &related_files, &[]);

        QueryResult { ranked, average_score, stage_reports: tracker.reports(), guidance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::config::SessionConfig;
    use engine_core::models::PackType;
    use engine_storage::SqliteStore;

    fn now() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    struct FakeEmbeddings;

    #[async_trait::async_trait]
    impl EmbeddingService for FakeEmbeddings {
        async fn embed(&self, text: &str, _model_id: &str) -> engine_core::Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0, 0.0])
        }

        fn dimension(&self, _model_id: &str) -> Option<usize> {
            Some(3)
        }
    }

    fn candidate(target_id: &str, module: &str) -> PackCandidate {
        let pack = ContextPack::new(PackType::FunctionContext, target_id, "summary", 0.5);
        let mut vector = MultiVector::new(target_id, "test-model", now());
        vector.set_aspect(Aspect::Semantic, vec![target_id.len() as f32, 1.0, 0.0], "input".into());
        PackCandidate {
            pack,
            module_name: module.to_string(),
            symbol_names: vec![],
            content: String::new(),
            vector: Some(vector),
            imports: vec![],
        }
    }

    fn pipeline() -> QueryPipeline {
        let storage: Arc<dyn Storage> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let embeddings: Arc<dyn EmbeddingService> = Arc::new(FakeEmbeddings);
        let sessions = Arc::new(SessionManager::new(SessionConfig::default()));
        QueryPipeline::new(storage, embeddings, sessions, RetrievalWeights::default(), "test-model")
    }

    #[tokio::test]
    async fn run_produces_a_full_stage_report_set() {
        let pipeline = pipeline();
        let candidates = vec![candidate("src/a.rs:f", "a"), candidate("src/b.rs:g", "b")];
        let result = pipeline.run("src/a.rs:f", TaskType::Feature, Depth::L1, candidates, now()).await.unwrap();
        assert_eq!(result.stage_reports.len(), 4);
        assert!(result.stage_reports.iter().all(|r| r.status != crate::stage_tracker::StageStatus::Skipped));
    }

    #[tokio::test]
    async fn direct_target_match_ranks_first() {
        let pipeline = pipeline();
        let candidates = vec![candidate("src/a.rs:f", "a"), candidate("src/b.rs:g", "b")];
        let result = pipeline.run("src/a.rs:f", TaskType::Feature, Depth::L1, candidates.clone(), now()).await.unwrap();
        assert_eq!(result.ranked[0].pack_id, candidates[0].pack.pack_id);
    }

    #[tokio::test]
    async fn follow_up_commits_ranked_packs_to_the_session() {
        let pipeline = pipeline();
        let session_id = pipeline.start_session(now()).unwrap();
        let candidates = vec![candidate("src/a.rs:f", "a")];
        let packs = pipeline.run_follow_up(session_id, "src/a.rs:f", TaskType::Feature, Depth::L1, candidates, now()).await.unwrap();
        assert_eq!(packs.len(), 1);
    }

    #[tokio::test]
    async fn empty_candidates_yields_partial_synthesis() {
        let pipeline = pipeline();
        let result = pipeline.run("nothing matches", TaskType::Feature, Depth::L1, vec![], now()).await.unwrap();
        let synthesis = result.stage_reports.iter().find(|r| r.stage == "synthesis").unwrap();
        assert_eq!(synthesis.status, crate::stage_tracker::StageStatus::Partial);
    }
}
