//! Single-domain lookup with failure isolation.
//!
//! A lookup never returns an error: whatever goes wrong is folded into
//! [`DomainResult::error`] so one bad domain can't abort a batch.

use crate::error::LookupError;
use crate::normalize::normalize;
use crate::protocols::WhoisQuery;
use crate::types::{DomainResult, ProgressCallback, ProgressEvent};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Server exchanges a single lookup may need: IANA discovery, the registry
/// query and the registrar referral.
const EXCHANGES_PER_LOOKUP: u32 = 3;

/// Hard limit for one whole lookup when each server exchange gets `timeout`.
///
/// One spare step on top of the three exchanges a lookup can make, so a
/// client's own per-exchange limits fire first and it can still return what
/// it has.
pub fn lookup_budget(timeout: Duration) -> Duration {
    timeout.saturating_mul(EXCHANGES_PER_LOOKUP + 1)
}

/// Wait `rate_delay`, query `domain`, and normalize the reply.
///
/// `timeout` is the per-exchange limit the client applies; the whole query is
/// cut off at [`lookup_budget`]. Progress events go to `progress` (if any) and
/// to the tracing subscriber. They are advisory and never change the
/// returned value.
#[instrument(skip(client, progress), fields(domain = %domain))]
pub async fn lookup_domain(
    client: &dyn WhoisQuery,
    domain: &str,
    rate_delay: Duration,
    timeout: Duration,
    progress: Option<&ProgressCallback>,
) -> DomainResult {
    if !rate_delay.is_zero() {
        tokio::time::sleep(rate_delay).await;
    }

    notify(progress, ProgressEvent::started(domain));
    debug!("Starting WHOIS lookup");

    let budget = lookup_budget(timeout);
    let outcome = match tokio::time::timeout(budget, client.query(domain)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(LookupError::timeout("WHOIS query", budget)),
    };

    match outcome {
        Ok(record) => {
            let result = normalize(domain, &record);
            info!(registrar = ?result.registrar, "Lookup succeeded");
            notify(
                progress,
                ProgressEvent::succeeded(domain, result.registrar.as_deref()),
            );
            result
        }
        Err(e) => {
            let message = e.to_string();
            warn!(error = %message, "Lookup failed");
            notify(progress, ProgressEvent::failed(domain, &message));
            DomainResult::failed(domain, message)
        }
    }
}

fn notify(progress: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = progress {
        callback(&event);
    }
}
