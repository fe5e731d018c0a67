//! `analyzeVectorRedundancy` (spec §4.E): checks whether the purpose and
//! semantic aspects are carrying duplicate signal across a sample set.

use crate::shared::models::{Aspect, MultiVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedundancyVerdict {
    KeepAll,
    DropRedundant,
    Consolidate,
}

#[derive(Debug, Clone)]
pub struct RedundancyReport {
    pub average_cosine: f64,
    pub sample_count: usize,
    pub verdict: RedundancyVerdict,
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

/// For each sample, scores the cosine similarity between its own `purpose`
/// and `semantic` vectors (the only pair the spec flags as a redundancy
/// candidate), and averages across the set. Above `threshold`, recommends
/// dropping one aspect; within 0.15 below it, recommends consolidating the
/// two into a single vector instead of dropping outright.
pub fn analyze_vector_redundancy(samples: &[MultiVector], threshold: f64) -> RedundancyReport {
    let scores: Vec<f64> = samples
        .iter()
        .filter_map(|s| match (s.get(Aspect::Purpose), s.get(Aspect::Semantic)) {
            (Some(p), Some(sem)) => Some(cosine_similarity(p, sem)),
            _ => None,
        })
        .collect();

    if scores.is_empty() {
        return RedundancyReport {
            average_cosine: 0.0,
            sample_count: 0,
            verdict: RedundancyVerdict::KeepAll,
        };
    }

    let average_cosine = scores.iter().sum::<f64>() / scores.len() as f64;
    let verdict = if average_cosine >= threshold {
        RedundancyVerdict::DropRedundant
    } else if average_cosine >= threshold - 0.15 {
        RedundancyVerdict::Consolidate
    } else {
        RedundancyVerdict::KeepAll
    };

    RedundancyReport {
        average_cosine,
        sample_count: scores.len(),
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(purpose: Vec<f32>, semantic: Vec<f32>) -> MultiVector {
        let mut mv = MultiVector::new("f.rs", "model-a", Utc::now());
        mv.set_aspect(Aspect::Purpose, purpose, String::new());
        mv.set_aspect(Aspect::Semantic, semantic, String::new());
        mv
    }

    #[test]
    fn identical_purpose_and_semantic_recommend_dropping() {
        let samples = vec![sample(vec![1.0, 0.0], vec![1.0, 0.0]), sample(vec![0.0, 1.0], vec![0.0, 1.0])];
        let report = analyze_vector_redundancy(&samples, 0.95);
        assert_eq!(report.verdict, RedundancyVerdict::DropRedundant);
    }

    #[test]
    fn orthogonal_purpose_and_semantic_keep_all() {
        let samples = vec![sample(vec![1.0, 0.0], vec![0.0, 1.0])];
        let report = analyze_vector_redundancy(&samples, 0.95);
        assert_eq!(report.verdict, RedundancyVerdict::KeepAll);
    }

    #[test]
    fn missing_aspects_are_skipped_not_counted() {
        let mut incomplete = MultiVector::new("g.rs", "model-a", Utc::now());
        incomplete.set_aspect(Aspect::Purpose, vec![1.0], String::new());
        let report = analyze_vector_redundancy(&[incomplete], 0.95);
        assert_eq!(report.sample_count, 0);
    }

    #[test]
    fn empty_sample_set_keeps_all() {
        let report = analyze_vector_redundancy(&[], 0.95);
        assert_eq!(report.verdict, RedundancyVerdict::KeepAll);
        assert_eq!(report.sample_count, 0);
    }
}
