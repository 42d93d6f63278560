//! HTTP file generator - converts failed cases to .http format

use crate::result::{ExecutionResult, RequestSnapshot};

/// Generate .http file content from the failed cases of a run.
///
/// Results without a built request (configuration errors, skips) are listed
/// as comments only.
pub fn to_http_file<'a>(failures: impl IntoIterator<Item = &'a ExecutionResult>) -> String {
    let failures: Vec<&ExecutionResult> = failures.into_iter().collect();
    let mut lines = Vec::new();

    lines.push(format!(
        "# Auto-generated reproduction cases ({} failures)",
        failures.len()
    ));
    lines.push(String::new());

    for (idx, result) in failures.iter().enumerate() {
        let reason = result.failure_reason().unwrap_or("no reason recorded");
        lines.push(format!(
            "### [{idx}] {} - {}",
            result.case_id, result.operation
        ));
        lines.push(format!("# {reason}"));

        match &result.request {
            Some(request) => {
                lines.push(request_to_http(request));
            }
            None => lines.push("# request was not built".to_string()),
        }

        lines.push(String::new());
        lines.push("###".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Generate a single request as .http format
pub fn request_to_http(request: &RequestSnapshot) -> String {
    let mut lines = vec![format!("{} {}", request.method, request.url)];

    for (key, value) in &request.headers {
        if !matches!(key.to_lowercase().as_str(), "host" | "content-length") {
            lines.push(format!("{key}: {value}"));
        }
    }

    if let Some(body) = &request.body {
        lines.push(String::new());
        lines.push(body.clone());
    }

    lines.join("\n")
}
