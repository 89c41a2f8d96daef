//! WHOIS Lookup CLI Application
//!
//! A command-line interface for looking up domain registration data over WHOIS.
//! This CLI application provides a user-friendly interface to the whois-lookup-lib library.

mod export;
mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{CommandFactory, Parser};
use export::ExportFormat;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use whois_lookup_lib::{
    load_env_config, parse_domain_list, parse_duration_string, validate_domains_detailed,
    ConfigManager, EnvConfig, FileConfig, LookupConfig, ProgressCallback, ProgressEvent,
    WhoisLookup,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for whois-lookup
#[derive(Parser, Debug)]
#[command(name = "whois-lookup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Get registrar information for domains over WHOIS")]
#[command(
    long_about = "Look up registrar, dates, name servers, status and contacts for a list of domains.\n\nLookups run concurrently with a per-worker rate limit; results can be shown as a table, a detailed view, JSON, or exported to CSV/JSON.",
    after_help = "Examples:\n  whois-lookup google.com facebook.com\n  whois-lookup -f domains.txt\n  whois-lookup --export csv google.com facebook.com\n  whois-lookup --detailed google.com\n  whois-lookup --rate-limit 1.0 --workers 3 google.com facebook.com"
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to look up
    #[arg(value_name = "DOMAINS", help_heading = "Input")]
    pub domains: Vec<String>,

    /// Read domains from a text file (whitespace separated, # comments)
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Input")]
    pub file: Option<String>,

    /// Show the detailed per-domain view instead of the table
    #[arg(long = "detailed", help_heading = "Output")]
    pub detailed: bool,

    /// Print results as JSON to stdout
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Suppress header, progress lines and footer
    #[arg(short = 'q', long = "quiet", help_heading = "Output")]
    pub quiet: bool,

    /// Export results to a file
    #[arg(long = "export", value_enum, value_name = "FORMAT", help_heading = "Export")]
    pub export: Option<ExportFormat>,

    /// Export file path (default: whois_results_<timestamp>.<ext>)
    #[arg(short = 'o', long = "output", value_name = "PATH", help_heading = "Export")]
    pub output: Option<PathBuf>,

    /// Directory for generated export files (default: current directory)
    #[arg(long = "output-dir", value_name = "DIR", help_heading = "Export")]
    pub output_dir: Option<PathBuf>,

    /// Delay each worker waits before a query, e.g. 0.5, 500ms, 1s (default: 0.5)
    #[arg(long = "rate-limit", value_name = "DELAY", help_heading = "Performance")]
    pub rate_limit: Option<String>,

    /// Maximum concurrent workers, 1-100 (default: 5)
    #[arg(short = 'w', long = "workers", value_name = "N", help_heading = "Performance")]
    pub workers: Option<usize>,

    /// Timeout for each WHOIS server exchange, e.g. 10s, 1m (default: 10s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging on stderr
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
struct RunSettings {
    lookup: LookupConfig,
    detailed: bool,
    export: Option<ExportFormat>,
    export_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // No input at all: show usage
    if args.domains.is_empty() && args.file.is_none() {
        let _ = Args::command().print_help();
        return;
    }

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "error"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(workers) = args.workers {
        if workers == 0 || workers > 100 {
            return Err("Workers must be between 1 and 100".to_string());
        }
    }

    if let Some(rate) = &args.rate_limit {
        if parse_duration_string(rate).is_none() {
            return Err(format!(
                "Invalid rate limit '{}'. Use a format like '0.5', '500ms', '1s'",
                rate
            ));
        }
    }

    if let Some(timeout) = &args.timeout {
        match parse_duration_string(timeout) {
            Some(t) if !t.is_zero() => {}
            _ => {
                return Err(format!(
                    "Invalid timeout '{}'. Use a format like '10s', '1m'",
                    timeout
                ))
            }
        }
    }

    if args.output.is_some() && args.export.is_none() {
        return Err("--output requires --export csv|json".to_string());
    }

    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let file_config = load_file_config(&args, &env_config)?;
    let settings = resolve_settings(&args, &file_config, &env_config)?;
    debug!(?settings, "Resolved settings");

    let raw_domains = collect_raw_domains(&args)?;
    let validated = validate_domains_detailed(&raw_domains);

    if !args.quiet && !args.json {
        for rejected in &validated.rejected {
            ui::print_skipped(rejected);
        }
    }

    if validated.valid.is_empty() {
        ui::print_no_valid_domains();
        return Ok(());
    }

    let show_progress = !args.quiet && !args.json;
    if show_progress {
        ui::print_header(
            validated.valid.len(),
            settings.lookup.rate_delay,
            settings.lookup.concurrency,
        );
    }

    let mut engine = WhoisLookup::with_config(settings.lookup.clone());
    if show_progress {
        let progress: ProgressCallback = Arc::new(|event: &ProgressEvent| ui::print_progress(event));
        engine = engine.with_progress(progress);
    }

    let start = Instant::now();
    let results = engine.dispatch_all(&validated.valid).await;
    let elapsed = start.elapsed();
    info!(count = results.len(), elapsed_ms = elapsed.as_millis() as u64, "Batch finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        if !args.quiet {
            ui::print_completed(elapsed);
        }
        if settings.detailed {
            ui::print_detailed_results(&results);
        } else {
            ui::print_results_table(&results);
        }
    }

    if let Some(format) = settings.export {
        let path = export::resolve_export_path(args.output.as_deref(), &settings.export_dir, format);
        export::export_results(&results, format, &path)?;
        if !args.json {
            ui::print_exported(&path);
        }
    }

    Ok(())
}

/// Load the config file: `--config`, then `WL_CONFIG`, then discovery.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    let explicit = args.config.as_ref().or(env_config.config.as_ref());
    match explicit {
        Some(path) => {
            info!(path = %path, "Using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e).into())
        }
        None => Ok(config_manager.discover_and_load()?),
    }
}

/// Merge settings with precedence CLI > environment > config file > defaults.
fn resolve_settings(
    args: &Args,
    file_config: &FileConfig,
    env_config: &EnvConfig,
) -> Result<RunSettings, String> {
    let mut lookup = LookupConfig::default();
    let mut detailed = false;
    let mut export = None;
    let mut export_dir = PathBuf::from(".");

    // Config file (validated when loaded, so parse failures can't happen here)
    if let Some(defaults) = &file_config.defaults {
        if let Some(workers) = defaults.workers {
            lookup = lookup.with_concurrency(workers);
        }
        if let Some(rate) = defaults.rate_limit.as_deref().and_then(parse_duration_string) {
            lookup = lookup.with_rate_delay(rate);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration_string) {
            lookup = lookup.with_timeout(timeout);
        }
        if let Some(flag) = defaults.detailed {
            detailed = flag;
        }
    }
    if let Some(output) = &file_config.output {
        if let Some(format) = &output.export_format {
            export = Some(format.parse::<ExportFormat>()?);
        }
        if let Some(dir) = &output.export_dir {
            export_dir = PathBuf::from(dir);
        }
    }

    // Environment
    if let Some(workers) = env_config.workers {
        lookup = lookup.with_concurrency(workers);
    }
    if let Some(rate) = env_config.rate_limit {
        lookup = lookup.with_rate_delay(rate);
    }
    if let Some(timeout) = env_config.timeout {
        lookup = lookup.with_timeout(timeout);
    }
    if let Some(flag) = env_config.detailed {
        detailed = flag;
    }
    if let Some(format) = &env_config.export {
        export = Some(format.parse::<ExportFormat>()?);
    }

    // CLI
    if let Some(workers) = args.workers {
        lookup = lookup.with_concurrency(workers);
    }
    if let Some(rate) = args.rate_limit.as_deref() {
        lookup = lookup.with_rate_delay(parse_required(rate, "rate limit")?);
    }
    if let Some(timeout) = args.timeout.as_deref() {
        lookup = lookup.with_timeout(parse_required(timeout, "timeout")?);
    }
    if args.detailed {
        detailed = true;
    }
    if args.export.is_some() {
        export = args.export;
    }
    if let Some(dir) = &args.output_dir {
        export_dir = dir.clone();
    }

    Ok(RunSettings {
        lookup,
        detailed,
        export,
        export_dir,
    })
}

fn parse_required(value: &str, what: &str) -> Result<Duration, String> {
    parse_duration_string(value).ok_or_else(|| format!("Invalid {} '{}'", what, value))
}

/// Gather raw domain strings from positional args and `--file`.
fn collect_raw_domains(args: &Args) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut domains = args.domains.clone();

    if let Some(file) = &args.file {
        domains.extend(read_domains_from_file(Path::new(file))?);
    }

    Ok(domains)
}

fn read_domains_from_file(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading file {}: {}", path.display(), e))?;
    Ok(parse_domain_list(&content))
}
