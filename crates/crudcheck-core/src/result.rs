//! Per-case execution results and run summary

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::verdict::Verdict;

/// Lifecycle state of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    NotRun,
    Passed,
    Failed,
    /// A prerequisite did not pass; the request was never sent
    Skipped,
    /// A tagged service defect is still present
    KnownDefect,
}

impl CaseStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRun => "not_run",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::KnownDefect => "known_defect",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::NotRun)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a case did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unresolved placeholder, unknown mock field, missing live field
    Configuration,
    /// Connection refused, timeout, unreadable body
    Transport,
    /// Status code or body expectation violated
    ContractMismatch,
    /// A prerequisite failed or was skipped
    DependencySkipped,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration error"),
            Self::Transport => write!(f, "transport failure"),
            Self::ContractMismatch => write!(f, "contract mismatch"),
            Self::DependencySkipped => write!(f, "dependency not passed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CaseFailure {
    pub kind: FailureKind,
    pub reason: String,
}

/// Request as it was (or would have been) sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Outcome of one case, finalized exactly once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionResult {
    pub case_id: String,
    /// `"GET /{petId}"`
    pub operation: String,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSnapshot>,
    /// Present only when the request was actually sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<CaseFailure>,
    #[serde(default)]
    pub used_mock: bool,
}

impl ExecutionResult {
    #[must_use]
    pub fn not_run(case_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            operation: operation.into(),
            status: CaseStatus::NotRun,
            request: None,
            observed_status: None,
            observed_body: None,
            elapsed_ms: None,
            failure: None,
            used_mock: false,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.reason.as_str())
    }
}

/// Counts per terminal status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub known_defects: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.status {
                CaseStatus::Passed => summary.passed += 1,
                CaseStatus::Failed | CaseStatus::NotRun => summary.failed += 1,
                CaseStatus::Skipped => summary.skipped += 1,
                CaseStatus::KnownDefect => summary.known_defects += 1,
            }
        }
        summary
    }

    /// Logical AND of every non-skipped outcome. Known defects do not count.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Complete run output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub base_url: String,
    /// One entry per declared case, in execution order
    pub results: Vec<ExecutionResult>,
    pub summary: RunSummary,
    pub verdict: Verdict,
}

impl RunReport {
    #[must_use]
    pub fn result(&self, case_id: &str) -> Option<&ExecutionResult> {
        self.results.iter().find(|r| r.case_id == case_id)
    }

    /// Results that did not pass and were actually attempted.
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results
            .iter()
            .filter(|r| r.status == CaseStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, status: CaseStatus) -> ExecutionResult {
        let mut r = ExecutionResult::not_run(id, "GET /{petId}");
        r.status = status;
        r
    }

    #[test]
    fn summary_counts_each_status() {
        let results = vec![
            result("a", CaseStatus::Passed),
            result("b", CaseStatus::Failed),
            result("c", CaseStatus::Skipped),
            result("d", CaseStatus::KnownDefect),
            result("e", CaseStatus::Passed),
        ];
        let s = RunSummary::from_results(&results);
        assert_eq!(
            s,
            RunSummary {
                total: 5,
                passed: 2,
                failed: 1,
                skipped: 1,
                known_defects: 1,
            }
        );
        assert!(!s.success());
    }

    #[test]
    fn skipped_alone_is_not_failure() {
        let s = RunSummary::from_results(&[
            result("a", CaseStatus::Passed),
            result("b", CaseStatus::Skipped),
        ]);
        assert!(s.success());
    }

    #[test]
    fn not_run_is_never_silently_passed() {
        let s = RunSummary::from_results(&[result("a", CaseStatus::NotRun)]);
        assert_eq!(s.failed, 1);
        assert!(!CaseStatus::NotRun.is_terminal());
    }

    #[test]
    fn status_serialization() {
        let json = serde_json::to_string(&CaseStatus::KnownDefect).unwrap();
        assert_eq!(json, "\"known_defect\"");
        let parsed: FailureKind = serde_json::from_str("\"contract_mismatch\"").unwrap();
        assert_eq!(parsed, FailureKind::ContractMismatch);
    }
}
