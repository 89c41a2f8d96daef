//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `WL_*`
//! environment variables, and merging file configurations with proper
//! precedence rules.

use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Export formats accepted in config files and `WL_EXPORT`.
pub const EXPORT_FORMATS: &[&str] = &["csv", "json"];

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Export preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Number of concurrent lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Per-worker delay before each query (e.g., "0.5", "500ms", "1s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<String>,

    /// Per-query timeout (e.g., "10s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Show the detailed per-domain view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed: Option<bool>,
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Export format written after every run ("csv" or "json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_format: Option<String>,

    /// Directory for generated export files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// The file is validated after parsing; an out-of-range worker count or a
    /// malformed duration is reported as [`LookupError::ConfigError`].
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, LookupError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LookupError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory file, then the current
    /// directory. Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, LookupError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => eprintln!("⚠️ Skipping config file {}: {}", path.display(), e),
            }
        }

        if self.verbose {
            for path in &loaded_files {
                info!(path = %path.display(), "Loaded config file");
            }
        }

        Ok(merged_config)
    }

    /// Config file in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./whois-lookup.toml", "./.whois-lookup.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config file in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".whois-lookup.toml", "whois-lookup.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Config file under the XDG config directory.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois-lookup").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values set in `higher` win field by field.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    workers: higher.workers.or(lower.workers),
                    rate_limit: higher.rate_limit.or(lower.rate_limit),
                    timeout: higher.timeout.or(lower.timeout),
                    detailed: higher.detailed.or(lower.detailed),
                }),
                (lower, higher) => higher.or(lower),
            },
            output: match (lower.output, higher.output) {
                (Some(lower), Some(higher)) => Some(OutputConfig {
                    export_format: higher.export_format.or(lower.export_format),
                    export_dir: higher.export_dir.or(lower.export_dir),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    /// Validate a configuration for common issues.
    pub fn validate_config(&self, config: &FileConfig) -> Result<(), LookupError> {
        if let Some(defaults) = &config.defaults {
            if let Some(workers) = defaults.workers {
                if workers == 0 || workers > 100 {
                    return Err(LookupError::config("workers must be between 1 and 100"));
                }
            }

            for (name, value) in [("rate_limit", &defaults.rate_limit), ("timeout", &defaults.timeout)] {
                if let Some(value) = value {
                    if parse_duration_string(value).is_none() {
                        return Err(LookupError::config(format!(
                            "Invalid {} '{}'. Use a format like '0.5', '500ms', '10s', '2m'",
                            name, value
                        )));
                    }
                }
            }

            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration_string) {
                if timeout.is_zero() {
                    return Err(LookupError::config("timeout must be greater than zero"));
                }
            }
        }

        if let Some(format) = config.output.as_ref().and_then(|o| o.export_format.as_deref()) {
            if !EXPORT_FORMATS.contains(&format.to_lowercase().as_str()) {
                return Err(LookupError::config(format!(
                    "Unsupported export_format '{}'. Use 'csv' or 'json'",
                    format
                )));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via `WL_*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub workers: Option<usize>,
    pub rate_limit: Option<Duration>,
    pub timeout: Option<Duration>,
    pub detailed: Option<bool>,
    pub export: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from `WL_*` environment variables.
///
/// Invalid values are reported on stderr and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Build an [`EnvConfig`] from any variable source.
pub fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("WL_WORKERS") {
        match val.trim().parse::<usize>() {
            Ok(workers) if (1..=100).contains(&workers) => env_config.workers = Some(workers),
            _ => eprintln!("⚠️ Invalid WL_WORKERS='{}', must be 1-100", val),
        }
    }

    if let Some(val) = lookup("WL_RATE_LIMIT") {
        match parse_duration_string(&val) {
            Some(delay) => env_config.rate_limit = Some(delay),
            None => eprintln!("⚠️ Invalid WL_RATE_LIMIT='{}', use a format like '0.5', '500ms', '1s'", val),
        }
    }

    if let Some(val) = lookup("WL_TIMEOUT") {
        match parse_duration_string(&val) {
            Some(timeout) if !timeout.is_zero() => env_config.timeout = Some(timeout),
            _ => eprintln!("⚠️ Invalid WL_TIMEOUT='{}', use a format like '10s', '2m'", val),
        }
    }

    if let Some(val) = lookup("WL_DETAILED") {
        match parse_bool(&val) {
            Some(flag) => env_config.detailed = Some(flag),
            None => eprintln!("⚠️ Invalid WL_DETAILED='{}', use true/false", val),
        }
    }

    if let Some(val) = lookup("WL_EXPORT") {
        let format = val.trim().to_lowercase();
        if EXPORT_FORMATS.contains(&format.as_str()) {
            env_config.export = Some(format);
        } else {
            eprintln!("⚠️ Invalid WL_EXPORT='{}', use csv or json", val);
        }
    }

    if let Some(path) = lookup("WL_CONFIG") {
        if !path.trim().is_empty() {
            env_config.config = Some(path);
        }
    }

    env_config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a duration like "0.5", "250ms", "1.5s" or "2m".
///
/// A bare number is seconds and may be fractional. Negative and non-finite
/// values are rejected.
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 0.001)
    } else if let Some(s) = value.strip_suffix('s') {
        (s, 1.0)
    } else if let Some(m) = value.strip_suffix('m') {
        (m, 60.0)
    } else {
        (value.as_str(), 1.0)
    };

    let number: f64 = number.trim().parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(number * scale).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_duration_string() {
        assert_eq!(parse_duration_string("0.5"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration_string("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_duration_string("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration_string("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration_string(" 2M "), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration_string("0"), Some(Duration::ZERO));
        assert_eq!(parse_duration_string("-1"), None);
        assert_eq!(parse_duration_string("fast"), None);
        assert_eq!(parse_duration_string("inf"), None);
        assert_eq!(parse_duration_string(""), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
workers = 8
rate_limit = "250ms"
timeout = "15s"
detailed = true

[output]
export_format = "json"
export_dir = "/tmp/reports"
"#,
        );

        let config = ConfigManager::new(false).load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.workers, Some(8));
        assert_eq!(defaults.rate_limit.as_deref(), Some("250ms"));
        assert_eq!(defaults.timeout.as_deref(), Some("15s"));
        assert_eq!(defaults.detailed, Some(true));

        let output = config.output.unwrap();
        assert_eq!(output.export_format.as_deref(), Some("json"));
        assert_eq!(output.export_dir.as_deref(), Some("/tmp/reports"));
    }

    #[test]
    fn test_invalid_workers() {
        let temp_file = write_config("[defaults]\nworkers = 0\n");
        let err = ConfigManager::new(false).load_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, LookupError::ConfigError { .. }));
    }

    #[test]
    fn test_invalid_duration_and_format() {
        let manager = ConfigManager::new(false);

        let bad_rate = write_config("[defaults]\nrate_limit = \"soon\"\n");
        assert!(manager.load_file(bad_rate.path()).is_err());

        let bad_format = write_config("[output]\nexport_format = \"xml\"\n");
        assert!(manager.load_file(bad_format.path()).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let manager = ConfigManager::new(false);

        for zero in ["0s", "0", "0ms"] {
            let config = write_config(&format!("[defaults]\ntimeout = \"{}\"\n", zero));
            let err = manager.load_file(config.path()).unwrap_err();
            assert_eq!(
                err,
                LookupError::config("timeout must be greater than zero")
            );
        }

        // A zero rate limit is fine: it just disables the delay
        let no_delay = write_config("[defaults]\nrate_limit = \"0\"\n");
        assert!(manager.load_file(no_delay.path()).is_ok());
    }

    #[test]
    fn test_malformed_toml() {
        let temp_file = write_config("[defaults\nworkers = 3\n");
        let err = ConfigManager::new(false).load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new(false)
            .load_file("/definitely/not/here/whois-lookup.toml")
            .unwrap_err();
        assert!(matches!(err, LookupError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                workers: Some(10),
                rate_limit: Some("1s".to_string()),
                detailed: Some(false),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                export_dir: Some("exports".to_string()),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                workers: Some(25),
                detailed: Some(true),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                export_format: Some("csv".to_string()),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();
        assert_eq!(defaults.workers, Some(25));
        assert_eq!(defaults.rate_limit.as_deref(), Some("1s"));
        assert_eq!(defaults.detailed, Some(true));

        let output = merged.output.unwrap();
        assert_eq!(output.export_format.as_deref(), Some("csv"));
        assert_eq!(output.export_dir.as_deref(), Some("exports"));
    }

    #[test]
    fn test_merge_with_missing_sections() {
        let manager = ConfigManager::new(false);
        let only_lower = FileConfig {
            defaults: Some(DefaultsConfig {
                workers: Some(3),
                ..Default::default()
            }),
            output: None,
        };

        let merged = manager.merge_configs(only_lower, FileConfig::default());
        assert_eq!(merged.defaults.unwrap().workers, Some(3));
        assert!(merged.output.is_none());
    }

    #[test]
    fn test_env_config_from_values() {
        let vars: HashMap<&str, &str> = [
            ("WL_WORKERS", "12"),
            ("WL_RATE_LIMIT", "0.25"),
            ("WL_TIMEOUT", "30s"),
            ("WL_DETAILED", "yes"),
            ("WL_EXPORT", "JSON"),
            ("WL_CONFIG", "/etc/whois-lookup.toml"),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(
            env_config,
            EnvConfig {
                workers: Some(12),
                rate_limit: Some(Duration::from_millis(250)),
                timeout: Some(Duration::from_secs(30)),
                detailed: Some(true),
                export: Some("json".to_string()),
                config: Some("/etc/whois-lookup.toml".to_string()),
            }
        );
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = [
            ("WL_WORKERS", "0"),
            ("WL_RATE_LIMIT", "whenever"),
            ("WL_TIMEOUT", "0"),
            ("WL_DETAILED", "maybe"),
            ("WL_EXPORT", "xml"),
            ("WL_CONFIG", "  "),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env_config, EnvConfig::default());
    }
}
