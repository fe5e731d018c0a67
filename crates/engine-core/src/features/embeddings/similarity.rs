//! `computeMultiVectorSimilarity` (spec §4.E): per-aspect cosine scores
//! combined with a query-type-specific weight table into a single score.

use crate::shared::models::{Aspect, MultiVector};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    PurposeQuery,
    SemanticQuery,
    StructuralQuery,
    DependencyQuery,
    UsageQuery,
}

/// Per-query-type weights over the five aspects, each summing to 1.0.
fn weights_for(query_type: QueryType) -> HashMap<Aspect, f64> {
    use Aspect::*;
    let pairs: [(Aspect, f64); 5] = match query_type {
        QueryType::PurposeQuery => [(Purpose, 0.70), (Semantic, 0.15), (Structural, 0.05), (Dependency, 0.05), (Usage, 0.05)],
        QueryType::SemanticQuery => [(Purpose, 0.20), (Semantic, 0.60), (Structural, 0.10), (Dependency, 0.05), (Usage, 0.05)],
        QueryType::StructuralQuery => [(Purpose, 0.05), (Semantic, 0.10), (Structural, 0.65), (Dependency, 0.10), (Usage, 0.10)],
        QueryType::DependencyQuery => [(Purpose, 0.05), (Semantic, 0.10), (Structural, 0.10), (Dependency, 0.65), (Usage, 0.10)],
        QueryType::UsageQuery => [(Purpose, 0.10), (Semantic, 0.15), (Structural, 0.10), (Dependency, 0.05), (Usage, 0.60)],
    };
    pairs.into_iter().collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct SimilarityResult {
    pub per_aspect: HashMap<Aspect, f64>,
    pub total: f64,
    /// Aspects whose cosine score exceeds 0.5.
    pub matched_aspects: Vec<Aspect>,
}

/// Any aspect missing from either vector contributes 0 to both the
/// per-aspect map and the weighted total.
pub fn compute_multi_vector_similarity(a: &MultiVector, b: &MultiVector, query_type: QueryType) -> SimilarityResult {
    let weights = weights_for(query_type);
    let mut per_aspect = HashMap::new();
    let mut total = 0.0;
    let mut matched_aspects = Vec::new();

    for aspect in Aspect::ALL {
        let score = match (a.get(aspect), b.get(aspect)) {
            (Some(va), Some(vb)) => cosine_similarity(va, vb),
            _ => 0.0,
        };
        per_aspect.insert(aspect, score);
        total += weights.get(&aspect).copied().unwrap_or(0.0) * score;
        if score > 0.5 {
            matched_aspects.push(aspect);
        }
    }

    SimilarityResult { per_aspect, total, matched_aspects }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vector_with(aspects: &[(Aspect, Vec<f32>)]) -> MultiVector {
        let mut mv = MultiVector::new("f.rs", "model-a", Utc::now());
        for (aspect, values) in aspects {
            mv.set_aspect(*aspect, values.clone(), String::new());
        }
        mv
    }

    #[test]
    fn identical_vectors_score_one_on_every_aspect() {
        let a = vector_with(&[(Aspect::Purpose, vec![1.0, 0.0]), (Aspect::Semantic, vec![0.0, 1.0])]);
        let b = vector_with(&[(Aspect::Purpose, vec![1.0, 0.0]), (Aspect::Semantic, vec![0.0, 1.0])]);
        let result = compute_multi_vector_similarity(&a, &b, QueryType::PurposeQuery);
        assert!((result.per_aspect[&Aspect::Purpose] - 1.0).abs() < 1e-9);
        assert!((result.per_aspect[&Aspect::Semantic] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_aspect_contributes_zero() {
        let a = vector_with(&[(Aspect::Purpose, vec![1.0, 0.0])]);
        let b = vector_with(&[]);
        let result = compute_multi_vector_similarity(&a, &b, QueryType::PurposeQuery);
        assert_eq!(result.per_aspect[&Aspect::Purpose], 0.0);
        assert_eq!(result.total, 0.0);
    }

    #[test]
    fn query_type_changes_weighting_of_total() {
        let a = vector_with(&[(Aspect::Purpose, vec![1.0, 0.0]), (Aspect::Structural, vec![0.0, 1.0])]);
        let b = vector_with(&[(Aspect::Purpose, vec![1.0, 0.0]), (Aspect::Structural, vec![1.0, 0.0])]);
        let purpose_total = compute_multi_vector_similarity(&a, &b, QueryType::PurposeQuery).total;
        let structural_total = compute_multi_vector_similarity(&a, &b, QueryType::StructuralQuery).total;
        assert!(purpose_total > structural_total);
    }

    #[test]
    fn orthogonal_vectors_do_not_match() {
        let a = vector_with(&[(Aspect::Usage, vec![1.0, 0.0])]);
        let b = vector_with(&[(Aspect::Usage, vec![0.0, 1.0])]);
        let result = compute_multi_vector_similarity(&a, &b, QueryType::UsageQuery);
        assert!(!result.matched_aspects.contains(&Aspect::Usage));
    }
}
