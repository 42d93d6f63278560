//! Verdict policy - turns a run summary into pass/fail and an exit code

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::result::RunSummary;

/// Exit code when every non-skipped case passed.
pub const EXIT_PASS: i32 = 0;
/// Exit code when at least one case failed.
pub const EXIT_FAIL: i32 = 1;
/// Exit code when the case configuration was rejected before execution.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for tool errors (unreadable config, I/O).
pub const EXIT_TOOL: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

/// How strictly known defects are judged.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerdictPolicy {
    /// Strict mode: a still-present known defect fails the run
    pub strict: bool,
}

impl VerdictPolicy {
    #[must_use]
    pub fn strict() -> Self {
        Self { strict: true }
    }

    #[must_use]
    pub fn verdict(&self, summary: &RunSummary) -> Verdict {
        let defects_fail = self.strict && summary.known_defects > 0;
        let status = if summary.success() && !defects_fail && summary.total > 0 {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };

        let reason = if summary.total == 0 {
            "No cases were declared".to_string()
        } else {
            let mut parts = vec![format!("{}/{} passed", summary.passed, summary.total)];
            if summary.failed > 0 {
                parts.push(format!("{} failed", summary.failed));
            }
            if summary.skipped > 0 {
                parts.push(format!("{} skipped", summary.skipped));
            }
            if summary.known_defects > 0 {
                let suffix = if defects_fail { " (strict)" } else { "" };
                parts.push(format!("{} known defects{suffix}", summary.known_defects));
            }
            parts.join(", ")
        };

        Verdict {
            status,
            exit_code: if status == VerdictStatus::Pass {
                EXIT_PASS
            } else {
                EXIT_FAIL
            },
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(passed: usize, failed: usize, skipped: usize, known_defects: usize) -> RunSummary {
        RunSummary {
            total: passed + failed + skipped + known_defects,
            passed,
            failed,
            skipped,
            known_defects,
        }
    }

    #[test]
    fn all_passed() {
        let v = VerdictPolicy::default().verdict(&summary(4, 0, 0, 0));
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.exit_code, EXIT_PASS);
        assert_eq!(v.reason, "4/4 passed");
    }

    #[test]
    fn failure_fails() {
        let v = VerdictPolicy::default().verdict(&summary(2, 1, 1, 0));
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, EXIT_FAIL);
        assert_eq!(v.reason, "2/4 passed, 1 failed, 1 skipped");
    }

    #[test]
    fn known_defects_pass_when_lenient() {
        let v = VerdictPolicy::default().verdict(&summary(3, 0, 0, 2));
        assert_eq!(v.status, VerdictStatus::Pass);
        assert!(v.reason.contains("2 known defects"));
    }

    #[test]
    fn known_defects_fail_when_strict() {
        let v = VerdictPolicy::strict().verdict(&summary(3, 0, 0, 2));
        assert_eq!(v.status, VerdictStatus::Fail);
        assert!(v.reason.ends_with("(strict)"));
    }

    #[test]
    fn empty_run_fails() {
        let v = VerdictPolicy::default().verdict(&RunSummary::default());
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.reason, "No cases were declared");
    }
}
