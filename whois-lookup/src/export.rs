//! Result export to CSV and JSON files.

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use whois_lookup_lib::{DomainResult, LookupError};

/// Separator used to flatten list fields into a single CSV cell.
const LIST_SEPARATOR: &str = "; ";

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unsupported export format '{}'", other)),
        }
    }
}

/// One CSV row; column order follows field order.
#[derive(Serialize)]
struct CsvRow<'a> {
    domain: &'a str,
    registrar: Option<&'a str>,
    creation_date: Option<&'a str>,
    expiration_date: Option<&'a str>,
    updated_date: Option<&'a str>,
    registrant_name: Option<&'a str>,
    registrant_organization: Option<&'a str>,
    registrant_country: Option<&'a str>,
    admin_email: Option<&'a str>,
    tech_email: Option<&'a str>,
    name_servers: String,
    status: String,
    error: Option<&'a str>,
}

impl<'a> From<&'a DomainResult> for CsvRow<'a> {
    fn from(result: &'a DomainResult) -> Self {
        Self {
            domain: &result.domain,
            registrar: result.registrar.as_deref(),
            creation_date: result.creation_date.as_deref(),
            expiration_date: result.expiration_date.as_deref(),
            updated_date: result.updated_date.as_deref(),
            registrant_name: result.registrant_name.as_deref(),
            registrant_organization: result.registrant_organization.as_deref(),
            registrant_country: result.registrant_country.as_deref(),
            admin_email: result.admin_email.as_deref(),
            tech_email: result.tech_email.as_deref(),
            name_servers: result.name_servers.join(LIST_SEPARATOR),
            status: result.status.join(LIST_SEPARATOR),
            error: result.error.as_deref(),
        }
    }
}

/// Timestamped file name, e.g. `whois_results_20250101_093000.csv`.
pub fn default_filename(format: ExportFormat, now: DateTime<Local>) -> String {
    format!(
        "whois_results_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Where an export should go: the explicit path, or a timestamped file in `dir`.
pub fn resolve_export_path(explicit: Option<&Path>, dir: &Path, format: ExportFormat) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => dir.join(default_filename(format, Local::now())),
    }
}

/// Write results to `path` in the given format.
pub fn export_results(
    results: &[DomainResult],
    format: ExportFormat,
    path: &Path,
) -> Result<(), LookupError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| LookupError::file_error(parent.to_string_lossy(), e.to_string()))?;
    }

    match format {
        ExportFormat::Csv => write_csv(results, path),
        ExportFormat::Json => write_json(results, path),
    }
}

fn write_csv(results: &[DomainResult], path: &Path) -> Result<(), LookupError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| LookupError::export(format!("{}: {}", path.display(), e)))?;

    for result in results {
        writer
            .serialize(CsvRow::from(result))
            .map_err(|e| LookupError::export(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| LookupError::export(e.to_string()))
}

fn write_json(results: &[DomainResult], path: &Path) -> Result<(), LookupError> {
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json).map_err(|e| LookupError::file_error(path.to_string_lossy(), e.to_string()))
}
