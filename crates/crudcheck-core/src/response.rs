//! Read surface shared by live responses and synthetic prior results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What downstream case logic may read from a prior response.
///
/// Implemented by [`ObservedResponse`] and [`crate::MockPriorResult`]; callers
/// never need to know which one they hold.
pub trait ResponseView {
    fn status_code(&self) -> u16;

    /// Read a top-level field rendered as a path-parameter string.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] when the field is not available. Never defaults.
    fn extract_field(&self, name: &str) -> Result<String, FieldError>;
}

/// Field lookup failure. Always a configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("mock prior result has no configured field '{0}'")]
    Unconfigured(String),
    #[error("response body has no top-level field '{0}'")]
    Missing(String),
    #[error("response body is not a JSON object")]
    NotAnObject,
}

/// A response as observed over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ObservedResponse {
    pub status: u16,
    pub body: String,
}

impl ObservedResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl ResponseView for ObservedResponse {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn extract_field(&self, name: &str) -> Result<String, FieldError> {
        let value: serde_json::Value =
            serde_json::from_str(&self.body).map_err(|_| FieldError::NotAnObject)?;
        let obj = value.as_object().ok_or(FieldError::NotAnObject)?;
        obj.get(name)
            .map(render_field)
            .ok_or_else(|| FieldError::Missing(name.to_string()))
    }
}

/// Render a JSON value the way it appears in a URL path.
pub(crate) fn render_field(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
