//! # WHOIS Lookup Library
//!
//! Concurrent, rate-limited WHOIS lookups that turn loosely-shaped registry
//! replies into fixed-shape [`DomainResult`] records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_lookup_lib::{LookupConfig, WhoisLookup};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = LookupConfig::default()
//!         .with_concurrency(3)
//!         .with_rate_delay(Duration::from_millis(500));
//!     let engine = WhoisLookup::with_config(config);
//!
//!     for result in engine.lookup_domains(&["example.com", "rust-lang.org"]).await {
//!         match &result.error {
//!             Some(error) => println!("{}: {}", result.domain, error),
//!             None => println!("{}: {:?}", result.domain, result.registrar),
//!         }
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **Validation**: trims, lowercases and filters hostnames before dispatch
//! - **Bounded concurrency**: a fixed number of workers, each rate limited
//! - **Failure isolation**: a failed lookup becomes an `error` field, never a batch abort
//! - **Normalization**: absent, scalar and list-valued fields all land in one shape
//! - **Pluggable client**: anything implementing [`WhoisQuery`] can serve records

// Re-export main public API types and functions
// This makes them available as whois_lookup_lib::TypeName
pub use checker::WhoisLookup;
pub use config::{
    env_config_from, load_env_config, parse_duration_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig, OutputConfig, EXPORT_FORMATS,
};
pub use error::LookupError;
pub use lookup::{lookup_budget, lookup_domain};
pub use normalize::{extract_list, extract_single, normalize};
pub use protocols::{extract_tld, get_whois_server, WhoisClient, WhoisQuery};
pub use record::{keys, FieldValue, RawRecord};
pub use types::{DomainResult, LookupConfig, LookupPhase, ProgressCallback, ProgressEvent};
pub use validate::{
    is_valid_domain, normalize_domain, parse_domain_list, validate_domains,
    validate_domains_detailed, ValidatedDomains,
};

// Internal modules - these are not part of the public API
mod checker;
mod config;
mod error;
mod lookup;
mod normalize;
mod protocols;
mod record;
mod types;
mod validate;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LookupError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
