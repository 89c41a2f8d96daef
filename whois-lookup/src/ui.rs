//! Terminal display logic for the whois-lookup CLI.
//!
//! Run header, live progress lines, the results table with its summary, and
//! the detailed per-domain view. Uses only the `console` crate for styling;
//! colors are dropped automatically when stdout is not a terminal.

use console::{pad_str, style, Alignment};
use std::time::Duration;
use whois_lookup_lib::{DomainResult, LookupPhase, ProgressEvent};

const RULE_WIDTH: usize = 80;
const DOMAIN_WIDTH: usize = 25;
const REGISTRAR_WIDTH: usize = 30;
const REGISTRAR_MAX_CHARS: usize = 28;
const STATUS_WIDTH: usize = 15;
const DETAIL_NAME_SERVERS: usize = 5;
const DETAIL_STATUSES: usize = 3;

// ── Classification ───────────────────────────────────────────────────────────

/// Table status of one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    /// Lookup succeeded and named a registrar
    Success,
    /// Lookup failed
    Error,
    /// Lookup succeeded but the record had no registrar
    NoData,
}

impl ResultStatus {
    pub fn of(result: &DomainResult) -> Self {
        if result.error.is_some() {
            ResultStatus::Error
        } else if result.registrar.is_some() {
            ResultStatus::Success
        } else {
            ResultStatus::NoData
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ResultStatus::Success => "Success",
            ResultStatus::Error => "Error",
            ResultStatus::NoData => "No Data",
        }
    }
}

/// Outcome counts for the summary block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub successful: usize,
    pub errors: usize,
    pub no_data: usize,
}

impl Summary {
    pub fn from_results(results: &[DomainResult]) -> Self {
        results
            .iter()
            .fold(Summary::default(), |mut summary, result| {
                match ResultStatus::of(result) {
                    ResultStatus::Success => summary.successful += 1,
                    ResultStatus::Error => summary.errors += 1,
                    ResultStatus::NoData => summary.no_data += 1,
                }
                summary
            })
    }
}

// ── Header / footer ──────────────────────────────────────────────────────────

/// Print the run header.
pub fn print_header(domain_count: usize, rate_delay: Duration, workers: usize) {
    println!();
    println!(
        "{}",
        style(format!(
            "🚀 Starting WHOIS lookup for {} domain{}",
            domain_count,
            if domain_count == 1 { "" } else { "s" }
        ))
        .magenta()
        .bold()
    );
    println!(
        "{}",
        style(format!(
            "Rate limit: {}s between requests",
            rate_delay.as_secs_f64()
        ))
        .blue()
    );
    println!("{}", style(format!("Max workers: {}", workers)).blue());
    println!();
}

pub fn print_completed(elapsed: Duration) {
    println!();
    println!(
        "{}",
        style(format!("🎉 Completed in {:.2} seconds", elapsed.as_secs_f64()))
            .green()
            .bold()
    );
    println!();
}

pub fn print_skipped(domain: &str) {
    eprintln!(
        "{}",
        style(format!("⚠️  Skipping invalid domain: {}", domain))
            .for_stderr()
            .yellow()
    );
}

pub fn print_no_valid_domains() {
    eprintln!(
        "{}",
        style("❌ No valid domains provided").for_stderr().red()
    );
}

pub fn print_exported(path: &std::path::Path) {
    println!(
        "{}",
        style(format!("✅ Results exported to: {}", path.display())).green()
    );
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// Render a progress event as a single line.
pub fn format_progress(event: &ProgressEvent) -> String {
    let detail = event.detail.as_deref().unwrap_or_default();
    match event.phase {
        LookupPhase::Started => style(format!("🔍 Looking up: {}", event.domain))
            .cyan()
            .to_string(),
        LookupPhase::Succeeded => style(format!("✅ {} -> {}", event.domain, detail))
            .green()
            .to_string(),
        LookupPhase::Failed => style(format!("❌ {} -> Error: {}", event.domain, detail))
            .red()
            .to_string(),
    }
}

pub fn print_progress(event: &ProgressEvent) {
    println!("{}", format_progress(event));
}

// ── Results table ────────────────────────────────────────────────────────────

/// Render one table row without trailing whitespace trimming.
pub fn format_table_row(result: &DomainResult) -> String {
    let registrar: String = match &result.registrar {
        Some(name) => name.chars().take(REGISTRAR_MAX_CHARS).collect(),
        None => "Unknown".to_string(),
    };

    let status = ResultStatus::of(result);
    let padded_status = pad_str(status.label(), STATUS_WIDTH, Alignment::Left, None);
    let styled_status = match status {
        ResultStatus::Success => style(padded_status).green(),
        ResultStatus::Error => style(padded_status).red(),
        ResultStatus::NoData => style(padded_status).yellow(),
    };

    format!(
        "{} {} {}",
        pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, None),
        pad_str(&registrar, REGISTRAR_WIDTH, Alignment::Left, None),
        styled_status
    )
}

/// Print the results table followed by the summary counts.
pub fn print_results_table(results: &[DomainResult]) {
    if results.is_empty() {
        return;
    }

    println!("{}", style("📊 RESULTS").magenta().bold());
    println!("{}", "=".repeat(RULE_WIDTH));
    println!(
        "{}",
        style(format!(
            "{} {} {}",
            pad_str("Domain", DOMAIN_WIDTH, Alignment::Left, None),
            pad_str("Registrar", REGISTRAR_WIDTH, Alignment::Left, None),
            pad_str("Status", STATUS_WIDTH, Alignment::Left, None),
        ))
        .bold()
    );
    println!("{}", "-".repeat(RULE_WIDTH));

    for result in results {
        println!("{}", format_table_row(result));
    }

    println!("{}", "-".repeat(RULE_WIDTH));
    print_summary(&Summary::from_results(results));
}

pub fn print_summary(summary: &Summary) {
    println!(
        "{}",
        style(format!("✅ Successful: {}", summary.successful)).green()
    );
    println!("{}", style(format!("❌ Errors: {}", summary.errors)).red());
    println!(
        "{}",
        style(format!("⚠️  No Data: {}", summary.no_data)).yellow()
    );
}

// ── Detailed view ────────────────────────────────────────────────────────────

/// Label/value lines shown in the detailed view, skipping absent values.
pub fn detail_lines(result: &DomainResult) -> Vec<(&'static str, &str)> {
    [
        ("Registrar", &result.registrar),
        ("Created", &result.creation_date),
        ("Expires", &result.expiration_date),
        ("Updated", &result.updated_date),
        ("Registrant", &result.registrant_name),
        ("Organization", &result.registrant_organization),
        ("Country", &result.registrant_country),
        ("Admin Email", &result.admin_email),
        ("Tech Email", &result.tech_email),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| (label, v))
    })
    .collect()
}

/// Print every result as a numbered block.
pub fn print_detailed_results(results: &[DomainResult]) {
    println!();
    println!("{}", style("📋 DETAILED RESULTS").magenta().bold());
    println!("{}", "=".repeat(RULE_WIDTH));

    for (i, result) in results.iter().enumerate() {
        println!();
        println!(
            "{}",
            style(format!("{}. {}", i + 1, result.domain.to_uppercase())).bold()
        );
        println!("{}", "-".repeat(40));

        if let Some(error) = &result.error {
            println!("{}", style(format!("❌ Error: {}", error)).red());
            continue;
        }

        for (label, value) in detail_lines(result) {
            let value = if label == "Registrar" {
                style(value).bold().to_string()
            } else {
                value.to_string()
            };
            println!("{} {}", style(format!("{}:", label)).cyan(), value);
        }

        if !result.name_servers.is_empty() {
            println!("{}", style("Name Servers:").cyan());
            for ns in result.name_servers.iter().take(DETAIL_NAME_SERVERS) {
                println!("  • {}", ns);
            }
        }

        if !result.status.is_empty() {
            let shown: Vec<&str> = result
                .status
                .iter()
                .take(DETAIL_STATUSES)
                .map(String::as_str)
                .collect();
            println!("{} {}", style("Status:").cyan(), shown.join(", "));
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn with_registrar(domain: &str, registrar: Option<&str>) -> DomainResult {
        DomainResult {
            domain: domain.to_string(),
            registrar: registrar.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_result_status() {
        assert_eq!(
            ResultStatus::of(&with_registrar("a.com", Some("ACME"))),
            ResultStatus::Success
        );
        assert_eq!(
            ResultStatus::of(&with_registrar("a.com", None)),
            ResultStatus::NoData
        );
        assert_eq!(
            ResultStatus::of(&DomainResult::failed("a.com", "boom")),
            ResultStatus::Error
        );
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            with_registrar("a.com", Some("ACME")),
            with_registrar("b.com", Some("ACME")),
            with_registrar("c.com", None),
            DomainResult::failed("d.com", "timeout"),
        ];
        assert_eq!(
            Summary::from_results(&results),
            Summary {
                successful: 2,
                errors: 1,
                no_data: 1
            }
        );
    }

    #[test]
    fn test_table_row_truncates_registrar() {
        let long = "An Extremely Long Registrar Name That Keeps Going";
        let row = console::strip_ansi_codes(&format_table_row(&with_registrar("a.com", Some(long))))
            .to_string();

        assert!(row.starts_with(&format!("{:<25} ", "a.com")));
        assert!(row.contains("An Extremely Long Registrar "));
        assert!(!row.contains("Keeps Going"));
        assert!(row.contains("Success"));
    }

    #[test]
    fn test_table_row_unknown_registrar() {
        let row = console::strip_ansi_codes(&format_table_row(&DomainResult::failed("x.io", "boom")))
            .to_string();
        assert!(row.contains("Unknown"));
        assert!(row.contains("Error"));
    }

    #[test]
    fn test_format_progress() {
        let started = console::strip_ansi_codes(&format_progress(&ProgressEvent::started("a.com")))
            .to_string();
        assert_eq!(started, "🔍 Looking up: a.com");

        let ok = console::strip_ansi_codes(&format_progress(&ProgressEvent::succeeded(
            "a.com",
            Some("ACME"),
        )))
        .to_string();
        assert_eq!(ok, "✅ a.com -> ACME");

        let failed = console::strip_ansi_codes(&format_progress(&ProgressEvent::failed(
            "a.com",
            "Timeout after 10s during: WHOIS query",
        )))
        .to_string();
        assert_eq!(failed, "❌ a.com -> Error: Timeout after 10s during: WHOIS query");
    }

    #[test]
    fn test_detail_lines_skip_missing_values() {
        let result = DomainResult {
            domain: "example.com".to_string(),
            registrar: Some("ACME".to_string()),
            expiration_date: Some("2030-01-01".to_string()),
            admin_email: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(
            detail_lines(&result),
            vec![("Registrar", "ACME"), ("Expires", "2030-01-01")]
        );
    }
}
