//! Core data types for WHOIS lookups.
//!
//! This module defines the main data structures used throughout the library:
//! the per-domain result record, lookup configuration, and progress events.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Registration data for one requested domain.
///
/// Exactly one `DomainResult` is produced per validated input domain. On the
/// failure path only `domain` and `error` are populated; every informational
/// field stays at its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainResult {
    /// The lowercase, trimmed domain that passed validation
    pub domain: String,

    /// The registrar that manages this domain
    pub registrar: Option<String>,

    /// When the domain was first registered (registry format, unparsed)
    pub creation_date: Option<String>,

    /// When the domain registration expires
    pub expiration_date: Option<String>,

    /// Last update date of the domain record
    pub updated_date: Option<String>,

    /// Nameservers in the order the registry listed them
    pub name_servers: Vec<String>,

    /// Domain status codes (e.g., "clientTransferProhibited")
    pub status: Vec<String>,

    pub registrant_name: Option<String>,
    pub registrant_organization: Option<String>,
    pub registrant_country: Option<String>,
    pub admin_email: Option<String>,
    pub tech_email: Option<String>,

    /// Human-readable failure message; set only when the lookup failed
    pub error: Option<String>,
}

impl DomainResult {
    /// Build the failure record for a domain.
    pub fn failed<D: Into<String>, E: Into<String>>(domain: D, error: E) -> Self {
        Self {
            domain: domain.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether the lookup for this domain failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the lookup succeeded and returned a registrar.
    pub fn has_data(&self) -> bool {
        self.error.is_none() && self.registrar.is_some()
    }
}

/// Lookup engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Maximum number of lookups in flight at once
    /// Default: 5, Range: 1-100
    pub concurrency: usize,

    /// Delay each worker waits after picking up a domain, before querying.
    /// Throttles per worker, not globally.
    /// Default: 500ms
    #[serde(skip)]
    pub rate_delay: Duration,

    /// Upper bound on a single WHOIS query
    /// Default: 10 seconds
    #[serde(skip)]
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            rate_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

impl LookupConfig {
    /// Set the concurrency limit, capped at 1..=100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the per-worker rate-limit delay.
    pub fn with_rate_delay(mut self, rate_delay: Duration) -> Self {
        self.rate_delay = rate_delay;
        self
    }

    /// Set the timeout for a single WHOIS query.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stage of a single lookup, as reported to progress sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPhase {
    Started,
    Succeeded,
    Failed,
}

/// Advisory progress notification for one domain.
///
/// `detail` carries the registrar on success and the error message on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub domain: String,
    pub phase: LookupPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProgressEvent {
    pub fn started(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            phase: LookupPhase::Started,
            detail: None,
        }
    }

    pub fn succeeded(domain: &str, registrar: Option<&str>) -> Self {
        Self {
            domain: domain.to_string(),
            phase: LookupPhase::Succeeded,
            detail: Some(registrar.unwrap_or("Unknown registrar").to_string()),
        }
    }

    pub fn failed(domain: &str, message: &str) -> Self {
        Self {
            domain: domain.to_string(),
            phase: LookupPhase::Failed,
            detail: Some(message.to_string()),
        }
    }
}

/// Receiver for progress events. Must not block; it runs inline with lookups.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

impl std::fmt::Display for LookupPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupPhase::Started => write!(f, "started"),
            LookupPhase::Succeeded => write!(f, "succeeded"),
            LookupPhase::Failed => write!(f, "failed"),
        }
    }
}
