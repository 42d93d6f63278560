//! JSON Schema for the run report

use crate::result::RunReport;

/// Generate JSON Schema for [`RunReport`], the `--output json` format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(RunReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
