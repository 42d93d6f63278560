//! Run plan types and config validation
//!
//! Describes what a run *would* do without sending any requests.
//! Used for pre-flight validation and CI previews.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Config;
use crate::case::Predecessor;
use crate::registry::TestRegistry;
use crate::schedule::{self, ScheduleError};

// ── Plan types ──

/// Complete plan: ordered cases, dependency levels, and config warnings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunPlan {
    pub base_url: String,
    /// Cases in execution order
    pub cases: Vec<PlannedCase>,
    /// Number of dependency levels
    pub depth: usize,
    /// Config validation results
    pub validations: Vec<Validation>,
}

/// One case as it will be dispatched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannedCase {
    pub id: String,
    /// `"PUT /{petId}"`
    pub operation: String,
    /// Dependency level (0 = no prerequisites)
    pub level: usize,
    pub depends_on: Vec<String>,
    pub expected_status: u16,
    /// `"mock"`, `"live:create_pet"`, or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_defect: Option<String>,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Build a plan from a config and its registry.
///
/// # Errors
///
/// Returns error if the dependency graph cannot be ordered.
pub fn build_plan(config: &Config, registry: &TestRegistry) -> Result<RunPlan, ScheduleError> {
    let order = schedule::order(registry)?;
    let levels = schedule::levels(registry, &order);
    let cases = registry.cases();

    let mut level_of = vec![0usize; cases.len()];
    for (depth, level) in levels.iter().enumerate() {
        for &i in level {
            level_of[i] = depth;
        }
    }

    let planned = order
        .iter()
        .map(|&i| {
            let case = &cases[i];
            PlannedCase {
                id: case.id.clone(),
                operation: case.label(),
                level: level_of[i],
                depends_on: case.depends_on.clone(),
                expected_status: case.expect.status,
                predecessor: case.predecessor.as_ref().map(|p| match p {
                    Predecessor::Mock(_) => "mock".to_string(),
                    Predecessor::Live { case } => format!("live:{case}"),
                }),
                known_defect: case.known_defect.clone(),
            }
        })
        .collect();

    Ok(RunPlan {
        base_url: config.base_url.clone(),
        cases: planned,
        depth: levels.len(),
        validations: validate_config(config),
    })
}

// ── Config validation ──

/// Patterns that suggest a placeholder value rather than a real credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-token",
    "your_token",
    "YOUR_TOKEN",
    "your-api-key",
    "YOUR_API_KEY",
    "CHANGEME",
    "changeme",
    "placeholder",
    "replace-me",
    "REPLACE_ME",
];

/// Validate config and produce validation results.
#[must_use]
pub fn validate_config(config: &Config) -> Vec<Validation> {
    let mut checks = Vec::new();

    if config.base_url.starts_with("http://") || config.base_url.starts_with("https://") {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Ok,
            message: format!("base_url: {}", config.base_url),
        });
    } else {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Error,
            message: format!(
                "base_url: {} (missing http:// or https:// prefix)",
                config.base_url
            ),
        });
    }

    if config.timeout_secs == 0 {
        checks.push(Validation {
            check: "timeout".into(),
            status: ValidationStatus::Warning,
            message: "timeout_secs: 0 (every request will time out)".into(),
        });
    }

    let mut header_issues = Vec::new();
    for (key, value) in &config.headers {
        if value.contains('<') && value.contains('>') {
            header_issues.push(format!("{key}: contains '<...>' placeholder"));
        }
        if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| value.contains(*p)) {
            header_issues.push(format!("{key}: contains '{pattern}', may be placeholder"));
        }
    }
    if header_issues.is_empty() {
        checks.push(Validation {
            check: "headers".into(),
            status: ValidationStatus::Ok,
            message: format!("headers: {} configured", config.headers.len()),
        });
    } else {
        checks.extend(header_issues.into_iter().map(|message| Validation {
            check: "headers".into(),
            status: ValidationStatus::Warning,
            message,
        }));
    }

    if !config.builtin_suite && config.cases.is_empty() {
        checks.push(Validation {
            check: "cases".into(),
            status: ValidationStatus::Error,
            message: "no cases: builtin_suite is off and no [[cases]] declared".into(),
        });
    }

    checks
}

// ── Display helpers ──

impl RunPlan {
    /// Format as human-readable terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Plan: {} cases in {} dependency levels against {}\n",
            self.cases.len(),
            self.depth,
            self.base_url,
        ));

        for (n, case) in self.cases.iter().enumerate() {
            let mut tags = Vec::new();
            if let Some(p) = &case.predecessor {
                tags.push(p.clone());
            }
            if case.known_defect.is_some() {
                tags.push("known-defect".to_string());
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            };
            lines.push(format!(
                "{:>3}. L{} {} {} -> {}{tags}",
                n + 1,
                case.level,
                case.id,
                case.operation,
                case.expected_status,
            ));
            if !case.depends_on.is_empty() {
                lines.push(format!("       after: {}", case.depends_on.join(", ")));
            }
        }
        lines.push(String::new());

        lines.push("Config validation:".into());
        for v in &self.validations {
            let icon = match v.status {
                ValidationStatus::Ok => "OK",
                ValidationStatus::Warning => "!!",
                ValidationStatus::Error => "NG",
            };
            lines.push(format!("  [{icon}] {}", v.message));
        }

        lines.join("\n")
    }

    /// Whether any validation produced an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn plan_for_builtin_suite() {
        let config = Config::default();
        let registry = config.registry().unwrap();
        let plan = build_plan(&config, &registry).unwrap();

        assert_eq!(plan.cases.len(), 14);
        assert_eq!(plan.depth, 5);
        assert_eq!(plan.cases[0].id, "create_pet");
        assert_eq!(plan.cases[0].operation, "POST /");

        let read_gone = plan
            .cases
            .iter()
            .find(|c| c.id == "read_non_existent_pet")
            .unwrap();
        assert_eq!(read_gone.level, 4);
        assert_eq!(read_gone.expected_status, 404);

        let ghost = plan
            .cases
            .iter()
            .find(|c| c.id == "update_non_existent_pet")
            .unwrap();
        assert_eq!(ghost.predecessor.as_deref(), Some("mock"));
        assert!(!plan.has_errors());
    }

    #[test]
    fn terminal_output_lists_cases() {
        let config = Config::default();
        let plan = build_plan(&config, &config.registry().unwrap()).unwrap();
        let text = plan.to_terminal();
        assert!(text.starts_with("Plan: 14 cases in 5 dependency levels"));
        assert!(text.contains("  1. L0 create_pet POST / -> 200"));
        assert!(text.contains("after: delete_pet"));
        assert!(text.contains("[mock]"));
        assert!(text.contains("[known-defect]"));
    }

    #[test]
    fn bad_base_url_is_error() {
        let config = Config {
            base_url: "localhost:8080".into(),
            ..Config::default()
        };
        let checks = validate_config(&config);
        assert!(
            checks
                .iter()
                .any(|c| c.check == "base_url" && c.status == ValidationStatus::Error)
        );
    }

    #[test]
    fn placeholder_header_is_warning() {
        let config = Config {
            headers: BTreeMap::from([("api_key".to_string(), "your-api-key".to_string())]),
            ..Config::default()
        };
        let checks = validate_config(&config);
        assert!(
            checks
                .iter()
                .any(|c| c.check == "headers" && c.status == ValidationStatus::Warning)
        );
    }

    #[test]
    fn empty_case_set_is_error() {
        let config = Config {
            builtin_suite: false,
            ..Config::default()
        };
        assert!(
            validate_config(&config)
                .iter()
                .any(|c| c.check == "cases" && c.status == ValidationStatus::Error)
        );
    }
}
