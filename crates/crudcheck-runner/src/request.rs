//! Request builder, no I/O
//!
//! Resolves `{name}` path placeholders and attaches configured headers.
//! Bodies are passed through untouched: negative cases rely on the exact
//! bytes reaching the server.

use std::collections::BTreeMap;

use crudcheck_core::{RequestSnapshot, TestCase};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("unresolved path placeholder '{{{name}}}' in '{template}'")]
    UnresolvedPlaceholder { name: String, template: String },
    #[error("unterminated '{{' in path template '{0}'")]
    UnterminatedPlaceholder(String),
}

/// Builds fully-addressed requests against one base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    headers: BTreeMap<String, String>,
}

impl RequestBuilder {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: BTreeMap::new(),
        }
    }

    /// Headers sent with every request; per-case headers take precedence.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `case`. `bound` values override the case's own
    /// `path_params`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if a placeholder has no value or is malformed.
    pub fn build(
        &self,
        case: &TestCase,
        bound: &BTreeMap<String, String>,
    ) -> Result<RequestSnapshot, BuildError> {
        let template = case.path_template();
        let path = substitute(template, |name| {
            bound.get(name).or_else(|| case.path_params.get(name))
        })?;

        let mut headers = self.headers.clone();
        headers.extend(case.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        let has_content_type = headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"));
        if case.body.is_some() && !has_content_type {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        Ok(RequestSnapshot {
            method: case.operation.method().to_string(),
            url: format!("{}{path}", self.base_url),
            headers,
            body: case.body.clone(),
        })
    }
}

/// Replace every `{name}` in `template` using `lookup`.
fn substitute<'a>(
    template: &str,
    lookup: impl Fn(&str) -> Option<&'a String>,
) -> Result<String, BuildError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| BuildError::UnterminatedPlaceholder(template.to_string()))?;
        let name = &after[..close];
        let value = lookup(name).ok_or_else(|| BuildError::UnresolvedPlaceholder {
            name: name.to_string(),
            template: template.to_string(),
        })?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
