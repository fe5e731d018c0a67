//! Pack ranking: base score from retrieval × persona weight, path penalty,
//! top-N cut (spec §4.G).

use crate::shared::constants::retrieval::EVAL_CORPUS_PENALTY;
use crate::shared::models::{ContextPack, PackType};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    BugFix,
    Feature,
    Refactor,
    Review,
    Guidance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    L0,
    L1,
    L2,
    L3,
}

#[derive(Debug, Clone)]
pub struct RankedPack {
    pub pack_id: uuid::Uuid,
    pub score: f64,
}

/// Penalized path roots (spec §4.G persona-weight step 3).
const PENALIZED_ROOTS: [&str; 3] = ["eval-corpus", "external-repos", "test-fixture"];

pub fn is_penalized_path(path: &str) -> bool {
    PENALIZED_ROOTS.iter().any(|root| path.contains(root))
}

fn depth_weight(depth: Depth, pack_type: PackType) -> f64 {
    use PackType::*;
    match (depth, pack_type) {
        (Depth::L0, _) => 0.5,
        (Depth::L1, FunctionContext | ModuleContext) => 1.2,
        (Depth::L1, _) => 1.0,
        (Depth::L2, _) => 1.0,
        (Depth::L3, DecisionContext | ProjectUnderstanding) => 1.3,
        (Depth::L3, _) => 1.0,
    }
}

fn task_weight(task: TaskType, pack_type: PackType) -> f64 {
    use PackType::*;
    match (task, pack_type) {
        (TaskType::BugFix, PatternContext) => 1.4,
        (TaskType::BugFix, SimilarTasks) => 1.3,
        (TaskType::Feature, PatternContext) => 1.2,
        (TaskType::Refactor, ChangeImpact) => 1.4,
        (TaskType::Review, ChangeImpact) => 1.3,
        (TaskType::Guidance, DocContext | ProjectUnderstanding) => 1.5,
        _ => 1.0,
    }
}

fn persona_boost(task: TaskType, pack_type: PackType) -> f64 {
    match (task, pack_type) {
        (TaskType::BugFix, PackType::GitHistory) => 0.1,
        (TaskType::Guidance, PackType::DocContext) => 0.1,
        _ => 0.0,
    }
}

fn max_packs_for_depth(depth: Depth, default_l1: usize) -> usize {
    match depth {
        Depth::L0 => 3,
        Depth::L1 => default_l1,
        Depth::L2 => default_l1 * 2,
        Depth::L3 => default_l1 * 3,
    }
}

/// Ranks `packs` for a query, returning the top `maxPacks` (by depth) in
/// descending score order, plus the average score of the returned set.
pub fn rank_packs(
    packs: &[ContextPack],
    score_by_target: &HashMap<String, f64>,
    depth: Depth,
    task: TaskType,
    default_max_packs_l1: usize,
) -> (Vec<RankedPack>, f64) {
    let mut ranked: Vec<RankedPack> = packs
        .iter()
        .map(|pack| {
            let base = match score_by_target.get(&pack.target_id) {
                Some(retrieval_score) => 0.7 * retrieval_score + 0.3 * pack.confidence,
                None => pack.confidence,
            };

            let persona = (depth_weight(depth, pack.pack_type) * task_weight(task, pack.pack_type) + persona_boost(task, pack.pack_type))
                .clamp(0.2, 2.5);

            let penalty = if pack.related_files.iter().any(|f| is_penalized_path(f)) {
                EVAL_CORPUS_PENALTY
            } else {
                1.0
            };

            RankedPack {
                pack_id: pack.pack_id,
                score: base * persona * penalty,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(max_packs_for_depth(depth, default_max_packs_l1));

    let average = if ranked.is_empty() {
        0.0
    } else {
        ranked.iter().map(|p| p.score).sum::<f64>() / ranked.len() as f64
    };

    (ranked, average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pack(target: &str, confidence: f64, pack_type: PackType) -> ContextPack {
        ContextPack::new(pack_type, target, "summary", confidence)
    }

    #[test]
    fn unranked_pack_falls_back_to_confidence_alone() {
        let packs = vec![pack("a.rs:f", 0.8, PackType::FunctionContext)];
        let (ranked, _) = rank_packs(&packs, &HashMap::new(), Depth::L1, TaskType::Feature, 6);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].score > 0.0);
    }

    #[test]
    fn eval_corpus_path_is_penalized() {
        let clean = pack("a.rs:f", 0.8, PackType::FunctionContext);
        let mut penalized = pack("b.rs:f", 0.8, PackType::FunctionContext);
        penalized.related_files.push("eval-corpus/b.rs".to_string());

        let packs = vec![clean, penalized];
        let (ranked, _) = rank_packs(&packs, &HashMap::new(), Depth::L1, TaskType::Feature, 6);
        let clean_score = ranked.iter().find(|p| p.pack_id == packs[0].pack_id).unwrap().score;
        let penalized_score = ranked.iter().find(|p| p.pack_id == packs[1].pack_id).unwrap().score;
        assert!(penalized_score < clean_score);
    }

    #[test]
    fn bug_fix_task_boosts_pattern_context() {
        let pattern = pack("a.rs:f", 0.5, PackType::PatternContext);
        let doc = pack("b.rs:f", 0.5, PackType::DocContext);
        let packs = vec![pattern.clone(), doc.clone()];
        let scores: HashMap<String, f64> = HashMap::from([
            (pattern.target_id.clone(), 0.5),
            (doc.target_id.clone(), 0.5),
        ]);
        let (ranked, _) = rank_packs(&packs, &scores, Depth::L1, TaskType::BugFix, 6);
        let pattern_score = ranked.iter().find(|p| p.pack_id == pattern.pack_id).unwrap().score;
        let doc_score = ranked.iter().find(|p| p.pack_id == doc.pack_id).unwrap().score;
        assert!(pattern_score > doc_score);
    }

    #[test]
    fn result_is_capped_at_max_packs_for_depth() {
        let packs: Vec<ContextPack> = (0..20).map(|i| pack(&format!("f{i}.rs:f"), 0.5, PackType::FunctionContext)).collect();
        let (ranked, _) = rank_packs(&packs, &HashMap::new(), Depth::L1, TaskType::Feature, 6);
        assert_eq!(ranked.len(), 6);
    }

    #[test]
    fn is_penalized_path_matches_all_three_roots() {
        assert!(is_penalized_path("eval-corpus/a.rs"));
        assert!(is_penalized_path("external-repos/b.rs"));
        assert!(is_penalized_path("tests/test-fixture/c.rs"));
        assert!(!is_penalized_path("src/main.rs"));
    }
}
