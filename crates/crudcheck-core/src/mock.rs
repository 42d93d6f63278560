//! Mock substitution layer
//!
//! Negative-path cases such as "update an id that was never created" must not
//! hinge on an earlier network round trip. They declare a [`MockPriorSpec`]
//! instead, and the runner reads bound values from a [`MockPriorResult`]
//! through the same [`ResponseView`] it uses for live responses.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::response::{FieldError, ResponseView, render_field};

/// Declared synthetic prior value, e.g. "a prior create returned id=1 with 200".
///
/// ```toml
/// [cases.predecessor.mock]
/// status = 200
/// fields = { id = 9999 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MockPriorSpec {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

fn default_status() -> u16 {
    200
}

impl MockPriorSpec {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Materialize the stand-in for one case execution.
    #[must_use]
    pub fn materialize(&self) -> MockPriorResult {
        MockPriorResult {
            status: self.status,
            fields: self.fields.clone(),
        }
    }
}

/// Synthetic stand-in for a live response. Scoped to one case execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPriorResult {
    status: u16,
    fields: BTreeMap<String, serde_json::Value>,
}

impl ResponseView for MockPriorResult {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn extract_field(&self, name: &str) -> Result<String, FieldError> {
        self.fields
            .get(name)
            .map(render_field)
            .ok_or_else(|| FieldError::Unconfigured(name.to_string()))
    }
}
