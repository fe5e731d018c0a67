//! Feature modules. Each follows the same internal shape where it has
//! sub-concerns: `domain` for pure logic, `application` for use-case
//! orchestration, `infrastructure` for trait adapters.

pub mod content_cache;
pub mod embeddings;
pub mod epistemic;
pub mod feedback;
pub mod graph_metrics;
pub mod measurement;
pub mod retrieval;
pub mod scan;
pub mod staleness;
