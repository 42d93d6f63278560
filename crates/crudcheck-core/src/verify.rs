//! Response verification
//!
//! Pure logic, no I/O. Only the observed status code and body matter, so the
//! same check applies to every execution path.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::case::ExpectedOutcome;

/// Verification rule, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    StatusCode,
    BodyContains,
    BodyNotContains,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StatusCode => write!(f, "status code"),
            Self::BodyContains => write!(f, "body contains"),
            Self::BodyNotContains => write!(f, "body does not contain"),
        }
    }
}

/// Outcome of verifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub passed: bool,
    /// First violated rule, if any
    pub rule: Option<Rule>,
    pub reason: String,
}

impl Verification {
    fn pass() -> Self {
        Self {
            passed: true,
            rule: None,
            reason: "all expectations met".to_string(),
        }
    }

    fn fail(rule: Rule, reason: String) -> Self {
        Self {
            passed: false,
            rule: Some(rule),
            reason,
        }
    }
}

/// Verify an observed `(status, body)` against the expected outcome.
#[must_use]
pub fn verify(status: u16, body: &str, expect: &ExpectedOutcome) -> Verification {
    if status != expect.status {
        return Verification::fail(
            Rule::StatusCode,
            format!(
                "{}: expected {}, got {status}",
                Rule::StatusCode, expect.status
            ),
        );
    }

    if let Some(needle) = &expect.body_contains {
        if !body.contains(needle.as_str()) {
            return Verification::fail(
                Rule::BodyContains,
                format!(
                    "{}: '{needle}' not found in {}",
                    Rule::BodyContains,
                    excerpt(body)
                ),
            );
        }
    }

    if let Some(needle) = &expect.body_not_contains {
        if body.contains(needle.as_str()) {
            return Verification::fail(
                Rule::BodyNotContains,
                format!(
                    "{}: '{needle}' found in {}",
                    Rule::BodyNotContains,
                    excerpt(body)
                ),
            );
        }
    }

    Verification::pass()
}

/// First 120 bytes of the body, cut on a char boundary.
fn excerpt(body: &str) -> String {
    const MAX: usize = 120;
    if body.is_empty() {
        return "empty body".to_string();
    }
    if body.len() <= MAX {
        return format!("body {body:?}");
    }
    let mut end = MAX;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("body {:?}…({} bytes total)", &body[..end], body.len())
}
