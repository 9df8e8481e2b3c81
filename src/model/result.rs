use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::{Finding, Severity};

/// What a checker reports after a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub checker_id: String,
    pub passed: bool,
    pub findings: Vec<Finding>,
}

impl CheckOutcome {
    /// An outcome that passes when there is nothing to report.
    pub fn from_findings(checker_id: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            checker_id: checker_id.into(),
            passed: findings.is_empty(),
            findings,
        }
    }
}

/// Per-checker entry of a [`ScanResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckerStatus {
    pub passed: bool,
    pub finding_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanMetadata {
    pub project_root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,
    pub checker_ids: Vec<String>,
}

/// Aggregate result of one orchestrated scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Deduplicated and sorted, most severe first.
    pub findings: Vec<Finding>,
    pub checkers: BTreeMap<String, CheckerStatus>,
    pub total_passed: usize,
    pub total_failed: usize,
    pub metadata: ScanMetadata,
}

impl ScanResult {
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity >= severity)
            .count()
    }

    pub fn has_at_least(&self, severity: Severity) -> bool {
        self.count_at_least(severity) > 0
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.checkers
            .iter()
            .filter_map(|(id, status)| status.error.as_deref().map(|e| (id.as_str(), e)))
    }
}
