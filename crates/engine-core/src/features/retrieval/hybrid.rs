//! Hybrid final score: `α·semantic + β·keyword + γ·structuralBoost`
//! (spec §4.G).

use crate::config::RetrievalWeights;
use crate::shared::constants::retrieval::MAX_STRUCTURAL_BOOST;

pub struct HybridInputs {
    pub semantic_score: f64,
    pub keyword_score: f64,
    /// Whether the candidate imports, is imported by, or shares a module
    /// with the top results so far.
    pub shares_import: bool,
    pub shares_module: bool,
}

/// `structuralBoost` is `+0.50` (spec constant) when either structural
/// signal is present, `0.0` otherwise, then folded in at `weights.structural_weight`.
pub fn hybrid_score(inputs: &HybridInputs, weights: &RetrievalWeights) -> f64 {
    let structural_boost = if inputs.shares_import || inputs.shares_module {
        MAX_STRUCTURAL_BOOST
    } else {
        0.0
    };

    (weights.semantic_weight * inputs.semantic_score + weights.keyword_weight * inputs.keyword_score + weights.structural_weight * structural_boost)
        .clamp(0.0, 1.0)
}
