//! Query-pipeline stage tracker (spec §4.H): records each of the four query
//! stages' `start`/`finish`/queued issues and derives a per-stage status so
//! callers can tell a clean miss (`partial`) from a genuine failure
//! (`failed`) from a stage that never ran at all (`skipped`).

use serde::{Deserialize, Serialize};

pub const STAGES: [&str; 4] = ["semantic_retrieval", "direct_packs", "graph_expansion", "synthesis"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    Success,
    Partial,
    Failed,
    Skipped,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Success => "success",
            StageStatus::Partial => "partial",
            StageStatus::Failed => "failed",
            StageStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StageRecord {
    started: bool,
    input_count: usize,
    finished: bool,
    output_count: usize,
    filtered_count: usize,
    issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub status: StageStatus,
    pub input_count: usize,
    pub output_count: usize,
    pub filtered_count: usize,
    pub issues: Vec<String>,
}

/// Per-query tracker; one instance covers the four stages of a single
/// retrieval call and is discarded once the report is read.
#[derive(Debug, Default)]
pub struct StageTracker {
    records: std::collections::HashMap<String, StageRecord>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, stage: &str, input_count: usize) {
        let record = self.records.entry(stage.to_string()).or_default();
        record.started = true;
        record.input_count = input_count;
    }

    pub fn finish(&mut self, stage: &str, output_count: usize, filtered_count: usize) {
        let record = self.records.entry(stage.to_string()).or_default();
        record.finished = true;
        record.output_count = output_count;
        record.filtered_count = filtered_count;
    }

    pub fn queue_issue(&mut self, stage: &str, issue: impl Into<String>) {
        let record = self.records.entry(stage.to_string()).or_default();
        record.issues.push(issue.into());
    }

    /// Marks every stage in `stages` that never saw `start()` as `skipped`,
    /// recording `reason` as its sole queued issue.
    pub fn finalize_missing(&mut self, stages: &[&str], reason: impl Into<String>) {
        let reason = reason.into();
        for stage in stages {
            let record = self.records.entry(stage.to_string()).or_default();
            if !record.started {
                record.issues.push(reason.clone());
            }
        }
    }

    fn status_of(record: &StageRecord) -> StageStatus {
        if !record.started {
            return StageStatus::Skipped;
        }
        if !record.issues.is_empty() {
            return if record.output_count == 0 {
                StageStatus::Failed
            } else {
                StageStatus::Partial
            };
        }
        if record.output_count == 0 {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }

    pub fn report(&self, stage: &str) -> StageReport {
        let empty = StageRecord::default();
        let record = self.records.get(stage).unwrap_or(&empty);
        StageReport {
            stage: stage.to_string(),
            status: Self::status_of(record),
            input_count: record.input_count,
            output_count: record.output_count,
            filtered_count: record.filtered_count,
            issues: record.issues.clone(),
        }
    }

    pub fn reports(&self) -> Vec<StageReport> {
        STAGES.iter().map(|s| self.report(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_finish_with_output_is_success() {
        let mut t = StageTracker::new();
        t.start("semantic_retrieval", 10);
        t.finish("semantic_retrieval", 4, 6);
        assert_eq!(t.report("semantic_retrieval").status, StageStatus::Success);
    }

    #[test]
    fn start_then_empty_finish_without_issues_is_partial() {
        let mut t = StageTracker::new();
        t.start("graph_expansion", 3);
        t.finish("graph_expansion", 0, 0);
        let report = t.report("graph_expansion");
        assert_eq!(report.status, StageStatus::Partial);
        assert_eq!(report.input_count, 3);
    }

    #[test]
    fn issues_with_empty_output_is_failed() {
        let mut t = StageTracker::new();
        t.start("direct_packs", 5);
        t.queue_issue("direct_packs", "pack lookup timed out");
        t.finish("direct_packs", 0, 0);
        assert_eq!(t.report("direct_packs").status, StageStatus::Failed);
    }

    #[test]
    fn issues_with_some_output_is_partial_not_failed() {
        let mut t = StageTracker::new();
        t.start("direct_packs", 5);
        t.queue_issue("direct_packs", "one lookup timed out");
        t.finish("direct_packs", 2, 3);
        assert_eq!(t.report("direct_packs").status, StageStatus::Partial);
    }

    #[test]
    fn never_started_stage_reports_skipped() {
        let t = StageTracker::new();
        assert_eq!(t.report("synthesis").status, StageStatus::Skipped);
    }

    #[test]
    fn finalize_missing_only_touches_stages_that_never_started() {
        let mut t = StageTracker::new();
        t.start("semantic_retrieval", 10);
        t.finish("semantic_retrieval", 5, 5);
        t.finalize_missing(&STAGES, "query deadline exceeded");

        assert_eq!(t.report("semantic_retrieval").status, StageStatus::Success);
        assert_eq!(t.report("direct_packs").status, StageStatus::Skipped);
        assert_eq!(t.report("synthesis").issues, vec!["query deadline exceeded".to_string()]);
    }

    #[test]
    fn reports_covers_all_four_stages_in_order() {
        let t = StageTracker::new();
        let reports = t.reports();
        let names: Vec<&str> = reports.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(names, STAGES.to_vec());
    }
}
