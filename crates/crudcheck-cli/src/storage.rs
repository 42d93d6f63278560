//! Persistent report storage: `~/.crudcheck/reports/`
//!
//! Every `crudcheck run` is saved regardless of `--output` mode.
//! Directory layout: `{host_port}_{timestamp}/`

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crudcheck_core::{Config, RunReport};

/// Everything needed to persist a run.
pub struct ReportData<'a> {
    pub config: &'a Config,
    pub report: &'a RunReport,
    pub strict: bool,
    pub duration_secs: f64,
}

/// Save a run report to `~/.crudcheck/reports/{host_port}_{timestamp}/`.
///
/// Returns the report directory path on success.
pub fn save_report(data: &ReportData) -> Result<PathBuf, std::io::Error> {
    save_report_in(&report_base_dir()?, data)
}

fn save_report_in(base: &Path, data: &ReportData) -> Result<PathBuf, std::io::Error> {
    let report_dir = base.join(build_dir_name(&data.config.base_url));
    std::fs::create_dir_all(&report_dir)?;

    // config.toml: snapshot of the config used
    let config_toml =
        toml::to_string_pretty(data.config).map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(report_dir.join("config.toml"), config_toml)?;

    let report = data.report;
    let summary = serde_json::json!({
        "verdict": report.verdict,
        "stats": report.summary,
        "meta": {
            "timestamp": timestamp_iso(),
            "duration_secs": data.duration_secs,
            "base_url": report.base_url,
            "strict": data.strict,
        },
    });
    std::fs::write(
        report_dir.join("summary.json"),
        serde_json::to_string_pretty(&summary).map_err(std::io::Error::other)?,
    )?;

    std::fs::write(
        report_dir.join("results.json"),
        serde_json::to_string_pretty(&report.results).map_err(std::io::Error::other)?,
    )?;

    // reproductions.http: replay failed requests in an IDE or with curl
    if report.failures().next().is_some() {
        let http_content = crudcheck_core::to_http_file(report.failures());
        std::fs::write(report_dir.join("reproductions.http"), http_content)?;
    }

    Ok(report_dir)
}

fn report_base_dir() -> Result<PathBuf, std::io::Error> {
    let home = std::env::var("HOME")
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
    Ok(PathBuf::from(home).join(".crudcheck").join("reports"))
}

/// `{host_port}_{timestamp}` e.g. `petstore.swagger.io_20261015T093000`
fn build_dir_name(base_url: &str) -> String {
    format!("{}_{}", extract_host_port(base_url), timestamp_compact())
}

/// `"http://localhost:8080/path"` → `"localhost_8080"`
fn extract_host_port(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("unknown")
        .replace(':', "_")
}

/// `"20261015T093000"`, filesystem-safe.
fn timestamp_compact() -> String {
    let (y, mo, d, h, mi, s) = utc_now();
    format!("{y:04}{mo:02}{d:02}T{h:02}{mi:02}{s:02}")
}

/// `"2026-10-15T09:30:00Z"`
fn timestamp_iso() -> String {
    let (y, mo, d, h, mi, s) = utc_now();
    format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}Z")
}

fn utc_now() -> (i32, u32, u32, u32, u32, u32) {
    let epoch_secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let days = i64::try_from(epoch_secs / 86_400).unwrap_or_default();
    let tod = u32::try_from(epoch_secs % 86_400).unwrap_or_default();
    let (y, m, d) = civil_from_days(days);
    (y, m, d, tod / 3600, (tod % 3600) / 60, tod % 60)
}

/// Epoch days → (year, month, day), proleptic Gregorian.
///
/// Reference: <https://howardhinnant.github.io/date_algorithms.html#civil_from_days>
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = (z - era * 146_097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = i64::from(yoe) + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as i32, m, d)
}
