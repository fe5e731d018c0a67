//! Scenario guidance table (spec §4.H): maps a query to one of a closed set
//! of operational scenarios and returns its checklist/risk lists, merged
//! with dynamic hints surfaced by the caller (related files, coverage gaps).

use engine_core::features::retrieval::TaskType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    IncidentResponse,
    SecurityReview,
    Compliance,
    Performance,
    BugTriage,
    ChangeImpact,
    Refactor,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::IncidentResponse => "incident_response",
            Scenario::SecurityReview => "security_review",
            Scenario::Compliance => "compliance",
            Scenario::Performance => "performance",
            Scenario::BugTriage => "bug_triage",
            Scenario::ChangeImpact => "change_impact",
            Scenario::Refactor => "refactor",
        }
    }

    /// Keywords checked against the query (case-insensitive, substring), in
    /// table order. First scenario with a hit wins.
    const KEYWORD_TABLE: &'static [(Scenario, &'static [&'static str])] = &[
        (Scenario::IncidentResponse, &["incident", "outage", "down", "pager"]),
        (Scenario::SecurityReview, &["security", "vulnerability", "cve", "exploit"]),
        (Scenario::Compliance, &["compliance", "audit", "policy", "regulation"]),
        (Scenario::Performance, &["slow", "latency", "performance", "throughput"]),
        (Scenario::BugTriage, &["bug", "crash", "regression", "broken"]),
        (Scenario::ChangeImpact, &["impact", "blast radius", "what breaks"]),
        (Scenario::Refactor, &["refactor", "cleanup", "restructure"]),
    ];

    fn from_keywords(query: &str) -> Option<Self> {
        let lower = query.to_lowercase();
        Self::KEYWORD_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
            .map(|(scenario, _)| *scenario)
    }

    fn from_task_type(task: TaskType) -> Self {
        match task {
            TaskType::BugFix => Scenario::BugTriage,
            TaskType::Feature => Scenario::ChangeImpact,
            TaskType::Refactor => Scenario::Refactor,
            TaskType::Review => Scenario::SecurityReview,
            TaskType::Guidance => Scenario::Compliance,
        }
    }

    /// Keyword-first, task-type-second, else the task-type fallback: in
    /// practice the second and third steps coincide, so this never fails to
    /// produce a scenario.
    pub fn select(query: &str, task: TaskType) -> Self {
        Self::from_keywords(query).unwrap_or_else(|| Self::from_task_type(task))
    }

    fn checklist(&self) -> Vec<&'static str> {
        match self {
            Scenario::IncidentResponse => vec![
                "identify the last deploy before the incident window",
                "pull the on-call runbook for the affected service",
                "check recent config and feature-flag changes",
            ],
            Scenario::SecurityReview => vec![
                "enumerate trust boundaries touched by the change",
                "check input validation at every external entry point",
                "review dependency changes for known advisories",
            ],
            Scenario::Compliance => vec![
                "confirm data handling matches the retention policy",
                "check audit logging is present on the affected path",
            ],
            Scenario::Performance => vec![
                "profile the hot path before and after",
                "check for added allocations or N+1 queries",
            ],
            Scenario::BugTriage => vec![
                "reproduce with the smallest failing input",
                "bisect against recent commits touching the area",
                "check test coverage of the failing path",
            ],
            Scenario::ChangeImpact => vec![
                "list all callers of the changed symbols",
                "check for cross-module contract changes",
            ],
            Scenario::Refactor => vec![
                "confirm behavior parity with existing tests",
                "check for call sites relying on internal details",
            ],
        }
    }

    fn risks(&self) -> Vec<&'static str> {
        match self {
            Scenario::IncidentResponse => vec!["mitigation may mask the root cause", "rollback may not be clean if schema changed"],
            Scenario::SecurityReview => vec!["fix may introduce a new bypass", "scope may be broader than the reported issue"],
            Scenario::Compliance => vec!["policy interpretation may be stale"],
            Scenario::Performance => vec!["optimization may trade memory for latency"],
            Scenario::BugTriage => vec!["fix may only address the reported symptom"],
            Scenario::ChangeImpact => vec!["indirect callers via reflection or dynamic dispatch may be missed"],
            Scenario::Refactor => vec!["behavior-preserving assumption may not hold under concurrency"],
        }
    }
}

const LIST_CAP: usize = 6;

#[derive(Debug, Clone)]
pub struct GuidanceReport {
    pub scenario: Scenario,
    pub checklist: Vec<String>,
    pub risks: Vec<String>,
}

/// Builds a scenario's guidance, merging in `related_files`/`coverage_gaps`
/// dynamic hints and capping each list at six entries.
pub fn build_guidance(query: &str, task: TaskType, related_files: &[String], coverage_gaps: &[String]) -> GuidanceReport {
    let scenario = Scenario::select(query, task);

    let mut checklist: Vec<String> = scenario.checklist().into_iter().map(str::to_string).collect();
    for file in related_files {
        checklist.push(format!("review changes in {file}"));
    }
    checklist.truncate(LIST_CAP);

    let mut risks: Vec<String> = scenario.risks().into_iter().map(str::to_string).collect();
    for gap in coverage_gaps {
        risks.push(format!("untested path: {gap}"));
    }
    risks.truncate(LIST_CAP);

    GuidanceReport { scenario, checklist, risks }
}
