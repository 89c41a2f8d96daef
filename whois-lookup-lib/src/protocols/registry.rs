//! TLD to WHOIS server mappings.
//!
//! Common TLDs resolve from a built-in table. Anything else is discovered
//! through an IANA referral query. IANA's answer is cached for the life of the
//! process, including "no server for this TLD". A failed IANA query is not
//! cached, so the next lookup asks again.

use crate::error::LookupError;
use crate::protocols::whois::{query_server, WHOIS_PORT};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Server that answers TLD referral queries
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

lazy_static! {
    static ref BUILTIN_SERVERS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("com", "whois.verisign-grs.com");
        m.insert("net", "whois.verisign-grs.com");
        m.insert("org", "whois.pir.org");
        m.insert("info", "whois.afilias.net");
        m.insert("biz", "whois.biz");
        m.insert("io", "whois.nic.io");
        m.insert("co", "whois.nic.co");
        m.insert("me", "whois.nic.me");
        m.insert("ai", "whois.nic.ai");
        m.insert("app", "whois.nic.google");
        m.insert("dev", "whois.nic.google");
        m.insert("xyz", "whois.nic.xyz");
        m.insert("tv", "whois.nic.tv");
        m.insert("cc", "ccwhois.verisign-grs.com");
        m.insert("us", "whois.nic.us");
        m.insert("uk", "whois.nic.uk");
        m.insert("de", "whois.denic.de");
        m.insert("fr", "whois.nic.fr");
        m.insert("nl", "whois.domain-registry.nl");
        m.insert("eu", "whois.eu");
        m.insert("ca", "whois.cira.ca");
        m.insert("au", "whois.auda.org.au");
        m.insert("jp", "whois.jprs.jp");
        m
    };

    /// TLD -> discovered server; `None` marks a TLD IANA had no server for
    static ref DISCOVERED_SERVERS: Mutex<HashMap<String, Option<String>>> =
        Mutex::new(HashMap::new());
}

/// Extract the TLD (last label) from a domain.
pub fn extract_tld(domain: &str) -> Result<String, LookupError> {
    match domain.rsplit_once('.') {
        Some((_, tld)) if !tld.is_empty() => Ok(tld.to_lowercase()),
        _ => Err(LookupError::invalid_domain(domain, "Domain has no TLD")),
    }
}

/// Look up the built-in server for a TLD.
pub fn get_builtin_whois_server(tld: &str) -> Option<&'static str> {
    BUILTIN_SERVERS.get(tld).copied()
}

/// Remember a discovered server (or the absence of one) for a TLD.
pub fn cache_whois_server(tld: &str, server: Option<String>) {
    if let Ok(mut cache) = DISCOVERED_SERVERS.lock() {
        cache.insert(tld.to_lowercase(), server);
    }
}

/// Cached discovery result: outer `None` means "never asked".
pub fn get_cached_whois_server(tld: &str) -> Option<Option<String>> {
    DISCOVERED_SERVERS
        .lock()
        .ok()
        .and_then(|cache| cache.get(&tld.to_lowercase()).cloned())
}

/// Resolve the WHOIS server for a TLD: built-in table, then cache, then IANA.
///
/// `Ok(None)` means IANA has no WHOIS server for the TLD. Errors are transport
/// failures talking to IANA.
pub async fn get_whois_server(tld: &str, timeout: Duration) -> Result<Option<String>, LookupError> {
    resolve_whois_server(tld, IANA_WHOIS_SERVER, WHOIS_PORT, timeout).await
}

pub(crate) async fn resolve_whois_server(
    tld: &str,
    iana_server: &str,
    iana_port: u16,
    timeout: Duration,
) -> Result<Option<String>, LookupError> {
    let tld = tld.to_lowercase();

    if let Some(server) = get_builtin_whois_server(&tld) {
        return Ok(Some(server.to_string()));
    }

    if let Some(cached) = get_cached_whois_server(&tld) {
        return Ok(cached);
    }

    let response = query_server(iana_server, iana_port, &tld, timeout).await?;
    let discovered = parse_iana_refer_response(&response);
    debug!(tld = %tld, server = ?discovered, "IANA referral lookup finished");
    cache_whois_server(&tld, discovered.clone());
    Ok(discovered)
}

/// Pull the authoritative server out of an IANA TLD reply.
///
/// IANA answers with `refer:` and usually `whois:` as well; `refer:` is
/// preferred when both are present and non-empty.
pub(crate) fn parse_iana_refer_response(response: &str) -> Option<String> {
    let field = |name: &str| {
        response
            .lines()
            .filter_map(|line| line.trim().strip_prefix(name))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_lowercase)
    };

    field("refer:").or_else(|| field("whois:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::testing::{closed_port, serve_reply};

    #[test]
    fn test_extract_tld() {
        assert_eq!(extract_tld("rust-lang.org").unwrap(), "org");
        assert_eq!(extract_tld("sub.example.CO.UK").unwrap(), "uk");
        assert!(extract_tld("localhost").is_err());
        assert!(extract_tld("trailing.").is_err());
    }

    #[test]
    fn test_builtin_servers() {
        assert_eq!(get_builtin_whois_server("com"), Some("whois.verisign-grs.com"));
        assert_eq!(get_builtin_whois_server("org"), Some("whois.pir.org"));
        assert_eq!(get_builtin_whois_server("notatld"), None);
    }

    #[test]
    fn test_server_cache_roundtrip() {
        assert_eq!(get_cached_whois_server("cache-test-tld"), None);

        cache_whois_server("cache-test-tld", Some("whois.nic.cache-test-tld".to_string()));
        assert_eq!(
            get_cached_whois_server("CACHE-TEST-TLD"),
            Some(Some("whois.nic.cache-test-tld".to_string()))
        );

        cache_whois_server("negative-test-tld", None);
        assert_eq!(get_cached_whois_server("negative-test-tld"), Some(None));
    }

    #[tokio::test]
    async fn test_get_whois_server_prefers_cache() {
        cache_whois_server("cachedonly", Some("whois.cachedonly.example".to_string()));
        assert_eq!(
            get_whois_server("cachedonly", Duration::from_millis(10)).await,
            Ok(Some("whois.cachedonly.example".to_string()))
        );
        assert_eq!(
            get_whois_server("COM", Duration::from_millis(10)).await,
            Ok(Some("whois.verisign-grs.com".to_string()))
        );
    }

    #[tokio::test]
    async fn test_failed_discovery_is_not_cached() {
        let timeout = Duration::from_millis(500);

        let err = resolve_whois_server("flakytld", "127.0.0.1", closed_port(), timeout)
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::NetworkError { .. }), "got {:?}", err);
        assert_eq!(get_cached_whois_server("flakytld"), None);

        // IANA comes back: the TLD resolves and the answer sticks
        let iana = serve_reply("127.0.0.1", 0, "domain:       FLAKYTLD\nrefer:        whois.nic.flakytld\n").await;
        assert_eq!(
            resolve_whois_server("flakytld", "127.0.0.1", iana.port, timeout).await,
            Ok(Some("whois.nic.flakytld".to_string()))
        );
        assert_eq!(
            get_cached_whois_server("flakytld"),
            Some(Some("whois.nic.flakytld".to_string()))
        );
    }

    #[tokio::test]
    async fn test_tld_without_server_is_cached() {
        let iana = serve_reply("127.0.0.1", 0, "% IANA WHOIS server\ndomain:       NOWHOIS\nstatus:       ACTIVE\n").await;

        assert_eq!(
            resolve_whois_server("nowhois", "127.0.0.1", iana.port, Duration::from_millis(500)).await,
            Ok(None)
        );
        assert_eq!(get_cached_whois_server("nowhois"), Some(None));

        // Answered from the cache without another query
        assert_eq!(
            resolve_whois_server("nowhois", "127.0.0.1", iana.port, Duration::from_millis(500)).await,
            Ok(None)
        );
        assert_eq!(iana.connections(), 1);
    }

    #[test]
    fn test_iana_reply_parsing() {
        let verisign = "% IANA WHOIS server\n\ndomain:       COM\nrefer:        whois.verisign-grs.com\nstatus:       ACTIVE\n";
        assert_eq!(
            parse_iana_refer_response(verisign).as_deref(),
            Some("whois.verisign-grs.com")
        );

        let whois_only = "domain:       ZZ\nwhois:        WHOIS.NIC.ZZ\n";
        assert_eq!(
            parse_iana_refer_response(whois_only).as_deref(),
            Some("whois.nic.zz")
        );

        let refer_wins = "whois:        whois.stale.zz\nrefer:        whois.fresh.zz\n";
        assert_eq!(
            parse_iana_refer_response(refer_wins).as_deref(),
            Some("whois.fresh.zz")
        );

        assert_eq!(parse_iana_refer_response("refer:\ndomain: ZZ\n"), None);
        assert_eq!(parse_iana_refer_response("% no match for ZZ\n"), None);
    }
}
