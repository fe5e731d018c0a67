//! Epistemic layer (spec §4.J): confidence algebra, evidence ledger
//! operations, defeaters/contradictions, calibration tracking, and
//! composition graph validation.

mod algebra;
mod calibration;
mod composition;
mod defeaters;
mod evidence;
mod normalize;

pub use algebra::{bayesian_update, conjunction, weighted_aggregate};
pub use calibration::CalibrationTracker;
pub use composition::{validate_composition_graph, CompositionEdge, CompositionOperator, GraphVersion};
pub use defeaters::{
    apply_defeaters, detect_contradictions, walk_support_graph, Claim, Contradiction, ContradictionSeverity, Defeater,
    DefeaterStatus, SupportGraphMetrics,
};
pub use evidence::{append_entry, get_chain, query_entries, EvidenceChain};
pub use normalize::normalize_claim_key;
