//! Batch WHOIS lookup orchestration.
//!
//! This module provides the primary `WhoisLookup` struct that validates input,
//! fans lookups out under a concurrency limit, and collects one result per
//! domain in input order.

use crate::lookup;
use crate::protocols::{WhoisClient, WhoisQuery};
use crate::types::{DomainResult, LookupConfig, ProgressCallback};
use crate::validate::validate_domains;
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Main lookup engine that coordinates WHOIS queries for many domains.
///
/// The `WhoisLookup` handles:
/// - Domain validation and normalization
/// - Bounded concurrent dispatch with a per-worker rate limit
/// - Per-domain failure isolation
/// - Index-aligned result collection
///
/// Dropping a pending batch future (or stream) cancels every in-flight lookup;
/// there is no separate cancellation signal.
///
/// # Example
///
/// ```rust,no_run
/// use whois_lookup_lib::WhoisLookup;
///
/// #[tokio::main]
/// async fn main() {
///     let engine = WhoisLookup::new();
///     let results = engine.lookup_domains(&["example.com", "rust-lang.org"]).await;
///     for result in results {
///         println!("{}: {:?}", result.domain, result.registrar);
///     }
/// }
/// ```
#[derive(Clone)]
pub struct WhoisLookup {
    /// Configuration settings for this engine instance
    config: LookupConfig,
    /// Source of raw WHOIS records
    client: Arc<dyn WhoisQuery>,
    /// Optional advisory progress sink
    progress: Option<ProgressCallback>,
}

impl WhoisLookup {
    /// Create a lookup engine with default configuration and the port-43 client.
    ///
    /// Default settings:
    /// - Concurrency: 5
    /// - Rate delay: 500ms per worker
    /// - Timeout: 10 seconds
    pub fn new() -> Self {
        Self::with_config(LookupConfig::default())
    }

    /// Create a lookup engine with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use whois_lookup_lib::{LookupConfig, WhoisLookup};
    /// use std::time::Duration;
    ///
    /// let config = LookupConfig::default()
    ///     .with_concurrency(10)
    ///     .with_rate_delay(Duration::from_millis(250));
    ///
    /// let engine = WhoisLookup::with_config(config);
    /// assert_eq!(engine.config().concurrency, 10);
    /// ```
    pub fn with_config(config: LookupConfig) -> Self {
        let client = Arc::new(WhoisClient::with_timeout(config.timeout));
        Self {
            config,
            client,
            progress: None,
        }
    }

    /// Replace the WHOIS client, e.g. with a mock or a custom transport.
    pub fn with_client(mut self, client: Arc<dyn WhoisQuery>) -> Self {
        self.client = client;
        self
    }

    /// Register a progress sink. Events are advisory only.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Look up a single, already-validated domain.
    pub async fn lookup_domain(&self, domain: &str) -> DomainResult {
        lookup::lookup_domain(
            self.client.as_ref(),
            domain,
            self.config.rate_delay,
            self.config.timeout,
            self.progress.as_ref(),
        )
        .await
    }

    /// Validate raw input and look up every domain that passes.
    ///
    /// Invalid entries are dropped with a warning; duplicates are kept and
    /// looked up independently.
    pub async fn lookup_domains<S: AsRef<str>>(&self, raw_domains: &[S]) -> Vec<DomainResult> {
        let domains = validate_domains(raw_domains);
        self.dispatch_all(&domains).await
    }

    /// Look up already-validated domains concurrently.
    ///
    /// At most `concurrency` lookups are in flight. Each one sleeps for the
    /// rate delay after it is picked up, so aggregate throughput scales with
    /// concurrency.
    ///
    /// Returns exactly `domains.len()` results; `result[i]` belongs to
    /// `domains[i]` whatever order the lookups finish in. Empty input yields
    /// an empty vector.
    #[instrument(skip(self, domains), fields(count = domains.len(), concurrency = self.config.concurrency))]
    pub async fn dispatch_all(&self, domains: &[String]) -> Vec<DomainResult> {
        if domains.is_empty() {
            info!("No domains to look up");
            return Vec::new();
        }

        let mut slots: Vec<Option<DomainResult>> = vec![None; domains.len()];
        let mut completed = self.lookup_stream(domains);

        while let Some((index, result)) = completed.next().await {
            debug!(index, domain = %result.domain, "Lookup finished");
            slots[index] = Some(result);
        }

        // Every index is yielded exactly once by the stream above
        slots
            .into_iter()
            .zip(domains)
            .map(|(slot, domain)| {
                slot.unwrap_or_else(|| DomainResult::failed(domain.as_str(), "Lookup did not complete"))
            })
            .collect()
    }

    /// Look up domains and yield `(input index, result)` pairs as they complete.
    ///
    /// This is useful for real-time display; pair it with the index to restore
    /// input order.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use whois_lookup_lib::WhoisLookup;
    /// use futures::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let engine = WhoisLookup::new();
    ///     let domains = vec!["example.com".to_string(), "example.org".to_string()];
    ///
    ///     let mut stream = engine.lookup_stream(&domains);
    ///     while let Some((index, result)) = stream.next().await {
    ///         println!("#{} {} -> {:?}", index, result.domain, result.registrar);
    ///     }
    /// }
    /// ```
    pub fn lookup_stream(
        &self,
        domains: &[String],
    ) -> Pin<Box<dyn Stream<Item = (usize, DomainResult)> + Send + '_>> {
        let domains = domains.to_vec();
        let concurrency = self.config.concurrency.max(1);

        let stream = stream::iter(domains.into_iter().enumerate())
            .map(move |(index, domain)| async move {
                let result = self.lookup_domain(&domain).await;
                (index, result)
            })
            .buffer_unordered(concurrency);

        Box::pin(stream)
    }

    /// Get the current configuration for this engine.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Update the configuration.
    ///
    /// The client is kept as is, along with its own per-exchange timeout.
    /// The overall cap on each lookup follows the new `timeout`.
    pub fn set_config(&mut self, config: LookupConfig) {
        self.config = config;
    }
}

impl Default for WhoisLookup {
    fn default() -> Self {
        Self::new()
    }
}
