//! WHOIS client implementations.
//!
//! The lookup engine only sees the [`WhoisQuery`] trait. The bundled
//! [`WhoisClient`] speaks the port-43 protocol; tests and embedders can plug
//! in their own implementation.

use crate::error::LookupError;
use crate::record::RawRecord;
use async_trait::async_trait;

/// WHOIS protocol implementation
pub mod whois;

/// TLD to WHOIS server mappings and IANA discovery
pub mod registry;

pub use registry::{extract_tld, get_whois_server};
pub use whois::WhoisClient;

/// Source of raw WHOIS records.
///
/// Implementations return whatever fields the server published; shape
/// normalization is left to the caller.
#[async_trait]
pub trait WhoisQuery: Send + Sync {
    async fn query(&self, domain: &str) -> Result<RawRecord, LookupError>;
}
