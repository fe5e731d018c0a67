//! Graph metrics (spec §4.F): algorithms over `Map<EntityId, Set<EntityId>>`
//! adjacency, plus the unified importance rollup.

mod betweenness;
mod centrality;
mod co_change;
mod hotspot;
mod importance;
mod pagerank;

pub use betweenness::betweenness_centrality;
pub use centrality::{closeness_centrality, eigenvector_centrality};
pub use co_change::{co_change_graph, CoChangeEdge};
pub use hotspot::hotspot_score;
pub use importance::{ImportanceFlags, ImportanceProfile, SubScores};
pub use pagerank::pagerank;

use std::collections::{BTreeMap, BTreeSet};

/// Adjacency over deterministic-ordered ids, matching the spec's tie-break
/// rule (lexical compare of entity ids) for free.
pub type Adjacency = BTreeMap<String, BTreeSet<String>>;
