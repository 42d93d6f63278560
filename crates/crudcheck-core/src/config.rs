//! Project configuration for contract runs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::case::TestCase;
use crate::registry::{RegistryError, TestRegistry};
use crate::suite;

/// Default target: the public petstore pet resource.
pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2/pet";

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the resource under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP headers sent with every request (auth, API keys, etc.)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Transport-level timeout per request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Include the built-in petstore suite
    #[serde(default = "default_true")]
    pub builtin_suite: bool,

    /// Leave out cases tagged as known defects
    #[serde(default)]
    pub skip_known_defects: bool,

    /// Extra cases, registered after the built-in suite
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            builtin_suite: true,
            skip_known_defects: false,
            cases: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.crudcheck.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Look for a default config file in `dir`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`]
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".crudcheck.toml", ".crudcheck.json", "crudcheck.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(&path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Build the case registry: built-in suite first, then configured cases.
    ///
    /// # Errors
    ///
    /// Returns error on duplicate ids or invalid case declarations
    pub fn registry(&self) -> Result<TestRegistry, RegistryError> {
        let mut registry = if self.builtin_suite {
            suite::petstore()
        } else {
            TestRegistry::new()
        };
        registry.extend(self.cases.iter().cloned())?;
        registry.validate()?;

        if self.skip_known_defects {
            Ok(registry.without_known_defects())
        } else {
            Ok(registry)
        }
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# crudcheck configuration

# Resource under test
base_url = "https://petstore.swagger.io/v2/pet"

# Per-request timeout (seconds)
timeout_secs = 10

# Run the built-in petstore CRUD suite
builtin_suite = true

# Leave out cases documenting known service defects
# skip_known_defects = true

# HTTP headers (auth, api keys)
[headers]
# api_key = "your-api-key"

# Extra cases run after the built-in suite
# [[cases]]
# id = "read_created_pet_by_bound_id"
# operation = "read"
# depends_on = ["create_pet"]
# predecessor = { live = { case = "create_pet" } }
# bind = { petId = "id" }
# expect = { status = 200, body_contains = "Doggie" }
#
# [[cases]]
# id = "update_ghost_pet"
# operation = "update"
# path = "/{petId}"
# body = '{ "id": 4242, "name": "Ghost" }'
# predecessor = { mock = { status = 200, fields = { id = 4242 } } }
# bind = { petId = "id" }
# expect = { status = 404 }
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{Operation, Predecessor};

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.builtin_suite);
        assert!(config.cases.is_empty());
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
base_url = "http://localhost:3000/pet"
timeout_secs = 3

[headers]
api_key = "special-key"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.base_url, "http://localhost:3000/pet");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(
            config.headers.get("api_key"),
            Some(&"special-key".to_string())
        );
        assert!(config.builtin_suite);
    }

    #[test]
    fn parse_toml_with_cases() {
        let toml = r#"
builtin_suite = false

[[cases]]
id = "create"
operation = "create"
body = '{"id": 7, "name": "Rex"}'
expect = { status = 200, body_contains = "Rex" }

[[cases]]
id = "read_back"
operation = "read"
depends_on = ["create"]
predecessor = { live = { case = "create" } }
bind = { petId = "id" }
expect = { status = 200 }

[[cases]]
id = "ghost"
operation = "delete"
predecessor = { mock = { fields = { id = 4242 } } }
bind = { petId = "id" }
expect = { status = 404 }
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cases.len(), 3);
        assert_eq!(config.cases[0].operation, Operation::Create);
        assert_eq!(
            config.cases[1].predecessor,
            Some(Predecessor::Live {
                case: "create".into()
            })
        );
        assert!(config.cases[2].uses_mock_predecessor());

        let reg = config.registry().unwrap();
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn example_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.builtin_suite);
    }

    #[test]
    fn registry_appends_to_builtin_suite() {
        let config = Config {
            cases: vec![crate::TestCase::new(
                "extra",
                Operation::Read,
                crate::ExpectedOutcome::status(404),
            )
            .depends_on("delete_pet")],
            ..Config::default()
        };
        let reg = config.registry().unwrap();
        assert_eq!(reg.len(), 15);
        assert_eq!(reg.cases().last().map(|c| c.id.as_str()), Some("extra"));
    }

    #[test]
    fn registry_rejects_duplicate_of_builtin() {
        let config = Config {
            cases: vec![crate::TestCase::new(
                "create_pet",
                Operation::Create,
                crate::ExpectedOutcome::status(200),
            )],
            ..Config::default()
        };
        assert!(matches!(
            config.registry(),
            Err(RegistryError::DuplicateId(_))
        ));
    }

    #[test]
    fn skip_known_defects_filters_suite() {
        let config = Config {
            skip_known_defects: true,
            ..Config::default()
        };
        let reg = config.registry().unwrap();
        assert_eq!(reg.len(), 12);
        assert!(reg.cases().iter().all(|c| c.known_defect.is_none()));
    }

    #[test]
    fn skip_known_defects_keeps_forward_declared_cases() {
        let toml = r#"
builtin_suite = false
skip_known_defects = true

[[cases]]
id = "read_back"
operation = "read"
depends_on = ["create"]
path_params = { petId = "7" }
expect = { status = 200 }

[[cases]]
id = "create"
operation = "create"
body = '{ "id": 7, "name": "Rex" }'
expect = { status = 200 }
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let reg = config.registry().unwrap();
        let ids: Vec<&str> = reg.cases().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["read_back", "create"]);
    }

    #[test]
    fn load_from_dir_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".crudcheck.json"),
            r#"{"base_url": "http://127.0.0.1:9/pet", "builtin_suite": false}"#,
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9/pet");
        assert!(!config.builtin_suite);
    }

    #[test]
    fn load_from_empty_dir_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "base_url = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
