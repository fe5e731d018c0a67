//! Composition graph validation (spec §4.J, §9 OQ4): referential integrity
//! over the operator/edge graphs that back support-graph and defeater
//! wiring. `V1` and `V2` are both accepted; `V2` additionally requires edges
//! to reference edge-capable operators. There is no automatic V1 -> V2
//! migrator — callers pick a version and validate against it as-is.

use crate::errors::CompositionError;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphVersion {
    V1,
    V2,
}

impl GraphVersion {
    fn from_u32(v: u32) -> Result<Self, CompositionError> {
        match v {
            1 => Ok(GraphVersion::V1),
            2 => Ok(GraphVersion::V2),
            other => Err(CompositionError::GraphVersionInvalid(other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompositionOperator {
    pub id: String,
    pub is_edge_operator: bool,
    /// Ids of other operators this one is defined in terms of.
    pub requires: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CompositionEdge {
    pub id: String,
    pub operator_id: String,
    /// Additional operator ids this edge's relationship depends on.
    pub relationship_refs: Vec<String>,
}

/// Validates `operators`/`edges` against `version` (raw `1` or `2`).
/// Checks run in order: version validity, duplicate operator ids, missing
/// primitives, operator/edge id collisions, missing relationship refs,
/// edge-operator typing (V2 only), and dependency cycles among operators.
pub fn validate_composition_graph(
    version: u32,
    operators: &[CompositionOperator],
    edges: &[CompositionEdge],
) -> Result<(), CompositionError> {
    let version = GraphVersion::from_u32(version)?;

    let mut seen_ids = HashSet::new();
    let mut duplicates = Vec::new();
    for op in operators {
        if !seen_ids.insert(op.id.clone()) {
            duplicates.push(op.id.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(CompositionError::DuplicateOperatorIds(duplicates));
    }

    let op_index: HashMap<&str, &CompositionOperator> = operators.iter().map(|o| (o.id.as_str(), o)).collect();

    let missing_primitives: Vec<String> = operators
        .iter()
        .flat_map(|o| o.requires.iter())
        .filter(|req| !op_index.contains_key(req.as_str()))
        .cloned()
        .collect();
    if !missing_primitives.is_empty() {
        return Err(CompositionError::MissingPrimitives(dedup(missing_primitives)));
    }

    for edge in edges {
        if op_index.contains_key(edge.id.as_str()) {
            return Err(CompositionError::OperatorIdCollision(edge.id.clone()));
        }
    }

    let missing_relationship_refs: Vec<String> = edges
        .iter()
        .flat_map(|e| std::iter::once(&e.operator_id).chain(e.relationship_refs.iter()))
        .filter(|req| !op_index.contains_key(req.as_str()))
        .cloned()
        .collect();
    if !missing_relationship_refs.is_empty() {
        return Err(CompositionError::MissingRelationshipRefs(dedup(missing_relationship_refs)));
    }

    if version == GraphVersion::V2 {
        for edge in edges {
            let operator = op_index[edge.operator_id.as_str()];
            if !operator.is_edge_operator {
                return Err(CompositionError::RelationshipEdgeOperator {
                    edge_id: edge.id.clone(),
                    operator_id: edge.operator_id.clone(),
                });
            }
        }
    }

    if let Some(cycle) = find_cycle(operators) {
        return Err(CompositionError::DependencyCycle(cycle));
    }

    Ok(())
}

fn dedup(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items.dedup();
    items
}

#[derive(PartialEq, Eq)]
enum VisitState {
    Visiting,
    Done,
}

fn find_cycle(operators: &[CompositionOperator]) -> Option<Vec<String>> {
    let index: HashMap<&str, &CompositionOperator> = operators.iter().map(|o| (o.id.as_str(), o)).collect();
    let mut state: HashMap<&str, VisitState> = HashMap::new();
    let mut stack = Vec::new();

    fn visit<'a>(
        id: &'a str,
        index: &HashMap<&'a str, &'a CompositionOperator>,
        state: &mut HashMap<&'a str, VisitState>,
        stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        match state.get(id) {
            Some(VisitState::Done) => return None,
            Some(VisitState::Visiting) => {
                let cycle_start = stack.iter().position(|s| s == id).unwrap_or(0);
                return Some(stack[cycle_start..].to_vec());
            }
            None => {}
        }

        state.insert(id, VisitState::Visiting);
        stack.push(id.to_string());

        if let Some(op) = index.get(id) {
            for dep in &op.requires {
                if let Some(cycle) = visit(dep.as_str(), index, state, stack) {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        state.insert(id, VisitState::Done);
        None
    }

    for op in operators {
        if let Some(cycle) = visit(op.id.as_str(), &index, &mut state, &mut stack) {
            return Some(cycle);
        }
    }
    None
}
