//! Embedding core (spec §4.E): five aspect vectors per file, their exact
//! input strings, multi-vector similarity, and redundancy analysis.

mod extract;
mod redundancy;
mod similarity;

pub use extract::{
    extract_dependency, extract_purpose, extract_semantic, extract_structural, extract_usage, DependencyFacts,
    ImportRef, SizeBucket, StructuralFacts,
};
pub use redundancy::{analyze_vector_redundancy, RedundancyReport, RedundancyVerdict};
pub use similarity::{compute_multi_vector_similarity, QueryType, SimilarityResult};
