//! DAG execution plan over the indexing phases. Spec §4.D fixes a strict
//! phase order, so `default_pipeline()` is a straight chain rather than a
//! branching graph — but the Kahn's-algorithm machinery stays general so a
//! future phase split (e.g. running symbol extraction per-language in
//! parallel) only needs new `StageNode` dependency edges, not a new engine.

use crate::error::{PipelineError, Result};
use crate::job::StageId;
use std::collections::{HashMap, HashSet};

/// Builds the content-cache key a stage's output is stored/looked-up under,
/// namespaced by workspace and the config's `analysis_version` so bumping
/// the version invalidates every cached stage output at once.
#[derive(Debug, Clone)]
pub struct CacheKeyManager {
    workspace_root: String,
    analysis_version: u32,
}

impl CacheKeyManager {
    pub fn new(workspace_root: impl Into<String>, analysis_version: u32) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            analysis_version,
        }
    }

    pub fn key_for_stage(&self, stage: StageId) -> String {
        format!("{}:{}:{}", stage.as_str(), self.workspace_root, self.analysis_version)
    }
}

#[derive(Debug, Clone)]
pub struct StageNode {
    pub id: StageId,
    pub name: &'static str,
    pub dependencies: Vec<StageId>,
    pub timeout_ms: u64,
}

impl StageNode {
    pub fn new(id: StageId, name: &'static str, dependencies: Vec<StageId>, timeout_ms: u64) -> Self {
        Self { id, name, dependencies, timeout_ms }
    }
}

/// A topologically-sorted execution plan: `Vec` of parallel groups, in
/// dependency order.
#[derive(Debug, Clone)]
pub struct PipelineDAG {
    stages: HashMap<StageId, StageNode>,
    execution_order: Vec<Vec<StageId>>,
}

impl PipelineDAG {
    pub fn new(stages: Vec<StageNode>) -> Result<Self> {
        let mut stage_map = HashMap::new();
        for stage in stages {
            stage_map.insert(stage.id, stage);
        }

        for stage in stage_map.values() {
            for dep in &stage.dependencies {
                if !stage_map.contains_key(dep) {
                    return Err(PipelineError::MissingDependency {
                        stage: stage.id.to_string(),
                        depends_on: dep.to_string(),
                    });
                }
            }
        }

        let execution_order = Self::topological_sort(&stage_map)?;
        Ok(Self { stages: stage_map, execution_order })
    }

    /// The spec's fixed eight-phase order, each phase depending only on the
    /// one before it.
    pub fn default_pipeline() -> Result<Self> {
        let names: HashMap<StageId, &'static str> = HashMap::from([
            (StageId::StructuralScan, "Structural Scan"),
            (StageId::SymbolExtraction, "Symbol Extraction"),
            (StageId::RelationshipDiscovery, "Relationship Discovery"),
            (StageId::EmbeddingGeneration, "Embedding Generation"),
            (StageId::Summarization, "Summarization"),
            (StageId::ContextPackGeneration, "Context Pack Generation"),
            (StageId::CalibrationSeed, "Calibration Seed"),
            (StageId::Verification, "Verification"),
        ]);

        let stages = StageId::ORDER
            .into_iter()
            .map(|id| {
                let deps = id.previous().into_iter().collect();
                StageNode::new(id, names[&id], deps, 300_000)
            })
            .collect();

        Self::new(stages)
    }

    fn topological_sort(stages: &HashMap<StageId, StageNode>) -> Result<Vec<Vec<StageId>>> {
        let mut in_degree: HashMap<StageId, usize> = stages.keys().map(|&id| (id, 0)).collect();
        for stage in stages.values() {
            *in_degree.get_mut(&stage.id).unwrap() += stage.dependencies.len();
        }

        let mut result = Vec::new();
        let mut processed = HashSet::new();

        while processed.len() < stages.len() {
            let mut ready: Vec<StageId> = in_degree
                .iter()
                .filter(|(id, &degree)| degree == 0 && !processed.contains(*id))
                .map(|(&id, _)| id)
                .collect();

            if ready.is_empty() {
                return Err(PipelineError::DagCycleDetected);
            }
            ready.sort_by_key(|s| s.as_str());

            for &stage_id in &ready {
                processed.insert(stage_id);
                in_degree.remove(&stage_id);
                for dependent in stages.values() {
                    if dependent.dependencies.contains(&stage_id) {
                        *in_degree.get_mut(&dependent.id).unwrap() -= 1;
                    }
                }
            }
            result.push(ready);
        }

        Ok(result)
    }

    pub fn execution_order(&self) -> &[Vec<StageId>] {
        &self.execution_order
    }

    pub fn get_stage(&self, id: StageId) -> Option<&StageNode> {
        self.stages.get(&id)
    }

    pub fn execution_plan(&self) -> String {
        self.execution_order
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let names: Vec<_> = group.iter().map(|id| self.stages[id].name).collect();
                if group.len() > 1 {
                    format!("Phase {}: {} (parallel)", i + 1, names.join(" \u{2225} "))
                } else {
                    format!("Phase {}: {}", i + 1, names[0])
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn required_cache_keys(&self, stage_id: StageId, cache_mgr: &CacheKeyManager) -> Vec<String> {
        match self.stages.get(&stage_id) {
            Some(stage) => stage.dependencies.iter().map(|dep| cache_mgr.key_for_stage(*dep)).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_namespaced_by_workspace_and_version() {
        let mgr = CacheKeyManager::new("/ws", 3);
        assert_eq!(mgr.key_for_stage(StageId::StructuralScan), "structural_scan:/ws:3");
    }

    #[test]
    fn simple_two_stage_chain_sorts_in_order() {
        let stages = vec![
            StageNode::new(StageId::StructuralScan, "Scan", vec![], 1000),
            StageNode::new(StageId::SymbolExtraction, "Symbols", vec![StageId::StructuralScan], 1000),
        ];
        let dag = PipelineDAG::new(stages).unwrap();
        let order = dag.execution_order();
        assert_eq!(order.len(), 2);
        assert_eq!(order[0], vec![StageId::StructuralScan]);
        assert_eq!(order[1], vec![StageId::SymbolExtraction]);
    }

    #[test]
    fn default_pipeline_is_a_strict_eight_phase_chain() {
        let dag = PipelineDAG::default_pipeline().unwrap();
        let order = dag.execution_order();
        assert_eq!(order.len(), 8);
        for group in order {
            assert_eq!(group.len(), 1, "spec phases run strictly in order, never in parallel");
        }
        assert_eq!(order[0], vec![StageId::StructuralScan]);
        assert_eq!(order[7], vec![StageId::Verification]);
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let stages = vec![StageNode::new(StageId::SymbolExtraction, "Symbols", vec![StageId::StructuralScan], 1000)];
        assert!(PipelineDAG::new(stages).is_err());
    }

    #[test]
    fn execution_plan_string_lists_each_phase() {
        let dag = PipelineDAG::default_pipeline().unwrap();
        let plan = dag.execution_plan();
        assert!(plan.contains("Phase 1: Structural Scan"));
        assert!(plan.contains("Phase 8: Verification"));
    }

    #[test]
    fn required_cache_keys_reflect_declared_dependencies() {
        let dag = PipelineDAG::default_pipeline().unwrap();
        let mgr = CacheKeyManager::new("/ws", 1);

        assert!(dag.required_cache_keys(StageId::StructuralScan, &mgr).is_empty());

        let keys = dag.required_cache_keys(StageId::SymbolExtraction, &mgr);
        assert_eq!(keys, vec![mgr.key_for_stage(StageId::StructuralScan)]);
    }
}
