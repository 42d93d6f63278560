//! Test case declarations
//!
//! A [`TestCase`] is immutable for the duration of a run. Everything the
//! runner needs to build, dispatch and verify a single request lives here.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::mock::MockPriorSpec;

/// CRUD operation against the resource under test.
///
/// ```toml
/// operation = "read"
/// operation = { custom = { method = "PATCH", path = "/{petId}" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `POST` on the collection
    Create,
    /// `GET /{petId}`
    Read,
    /// `PUT` on the collection, id carried in the body
    Update,
    /// `DELETE /{petId}`
    Delete,
    /// Any other verb and path template
    Custom { method: String, path: String },
}

impl Operation {
    /// HTTP method, upper-case.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Create => "POST",
            Self::Read => "GET",
            Self::Update => "PUT",
            Self::Delete => "DELETE",
            Self::Custom { method, .. } => method,
        }
    }

    /// Path template relative to the base URL.
    #[must_use]
    pub fn default_path(&self) -> &str {
        match self {
            Self::Create | Self::Update => "",
            Self::Read | Self::Delete => "/{petId}",
            Self::Custom { path, .. } => path,
        }
    }
}

/// Expected outcome of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedOutcome {
    /// Exact status code
    pub status: u16,
    /// Literal, case-sensitive substring the body must contain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_contains: Option<String>,
    /// Literal, case-sensitive substring the body must not contain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_not_contains: Option<String>,
}

impl ExpectedOutcome {
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body_contains: None,
            body_not_contains: None,
        }
    }

    #[must_use]
    pub fn containing(mut self, needle: impl Into<String>) -> Self {
        self.body_contains = Some(needle.into());
        self
    }

    #[must_use]
    pub fn not_containing(mut self, needle: impl Into<String>) -> Self {
        self.body_not_contains = Some(needle.into());
        self
    }
}

/// Source of the values bound into path parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Predecessor {
    /// The recorded response of a case listed in `depends_on`
    Live { case: String },
    /// A synthetic prior result; no network involved
    Mock(MockPriorSpec),
}

/// A declared unit of verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TestCase {
    /// Unique name, stable across a run
    pub id: String,
    pub operation: Operation,
    /// Overrides the operation's default path template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Cases that must pass before this one runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Literal payload, sent byte-for-byte
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path_params: BTreeMap<String, String>,
    /// Extra headers for this case only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub expect: ExpectedOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<Predecessor>,
    /// Placeholder name -> field read from the predecessor
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bind: BTreeMap<String, String>,
    /// Documents a known service defect; a violated expectation is recorded, not failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_defect: Option<String>,
}

impl TestCase {
    #[must_use]
    pub fn new(id: impl Into<String>, operation: Operation, expect: ExpectedOutcome) -> Self {
        Self {
            id: id.into(),
            operation,
            path: None,
            depends_on: Vec::new(),
            body: None,
            path_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            expect,
            predecessor: None,
            bind: BTreeMap::new(),
            known_defect: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Bind path parameters from a synthetic prior result.
    #[must_use]
    pub fn with_mock_predecessor(mut self, spec: MockPriorSpec) -> Self {
        self.predecessor = Some(Predecessor::Mock(spec));
        self
    }

    /// Bind path parameters from a dependency's recorded response.
    /// The dependency is added to `depends_on` if missing.
    #[must_use]
    pub fn with_live_predecessor(mut self, case: impl Into<String>) -> Self {
        let case = case.into();
        if !self.depends_on.contains(&case) {
            self.depends_on.push(case.clone());
        }
        self.predecessor = Some(Predecessor::Live { case });
        self
    }

    #[must_use]
    pub fn binding(mut self, param: impl Into<String>, field: impl Into<String>) -> Self {
        self.bind.insert(param.into(), field.into());
        self
    }

    #[must_use]
    pub fn known_defect(mut self, note: impl Into<String>) -> Self {
        self.known_defect = Some(note.into());
        self
    }

    /// Path template after applying the per-case override.
    #[must_use]
    pub fn path_template(&self) -> &str {
        self.path
            .as_deref()
            .unwrap_or_else(|| self.operation.default_path())
    }

    /// `"PUT /{petId}"`
    #[must_use]
    pub fn label(&self) -> String {
        let path = self.path_template();
        if path.is_empty() {
            format!("{} /", self.operation.method())
        } else {
            format!("{} {path}", self.operation.method())
        }
    }

    #[must_use]
    pub fn uses_mock_predecessor(&self) -> bool {
        matches!(self.predecessor, Some(Predecessor::Mock(_)))
    }
}
