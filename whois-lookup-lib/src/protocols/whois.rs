//! WHOIS protocol client.
//!
//! Queries registry WHOIS servers over TCP port 43, optionally follows the
//! registrar referral found in a thin registry reply, and turns the text reply
//! into a [`RawRecord`]. Interpretation of the fields is left to the normalizer.

use crate::error::LookupError;
use crate::protocols::registry::{extract_tld, get_whois_server};
use crate::protocols::WhoisQuery;
use crate::record::RawRecord;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument};

/// Standard WHOIS port
pub const WHOIS_PORT: u16 = 43;
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;
/// Deadline used when `now + limit` would overflow
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365);

lazy_static! {
    static ref REFERRAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?im)^[ \t]*Registrar WHOIS Server:[ \t]*(\S+)").expect("valid referral regex"),
        Regex::new(r"(?im)^[ \t]*ReferralServer:[ \t]*(\S+)").expect("valid referral regex"),
    ];
}

/// Replies that mean the registry has no record for the domain.
const NOT_FOUND_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "status: free",
    "status: available",
    "no matching record",
    "object does not exist",
    "the queried object does not exist",
    "this domain name has not been registered",
];

/// Replies that mean the server is throttling us.
const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "too many requests",
    "try again later",
    "quota exceeded",
    "limit exceeded",
    "throttled",
    "rate-limited",
];

/// WHOIS client speaking the port-43 protocol.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Time allowed for each server exchange (connect, send, read the reply)
    timeout: Duration,
    /// Query this server instead of resolving one per TLD
    server: Option<String>,
    /// Port used for registry and referral queries
    port: u16,
    /// Follow the registrar referral in thin registry replies
    follow_referrals: bool,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            server: None,
            port: WHOIS_PORT,
            follow_referrals: true,
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::new()
        }
    }

    /// Always query `server`, skipping TLD resolution.
    pub fn with_server<S: Into<String>>(mut self, server: S) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Connect to `port` instead of 43 for registry and referral queries.
    ///
    /// TLD discovery always goes to IANA on the standard port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable following registrar referrals.
    pub fn with_referrals(mut self, enabled: bool) -> Self {
        self.follow_referrals = enabled;
        self
    }

    /// Fetch and parse the WHOIS record for a domain.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn lookup(&self, domain: &str) -> Result<RawRecord, LookupError> {
        let server = match &self.server {
            Some(server) => server.clone(),
            None => {
                let tld = extract_tld(domain)?;
                get_whois_server(&tld, self.timeout)
                    .await?
                    .ok_or_else(|| LookupError::server_not_found(tld))?
            }
        };

        debug!(server = %server, "Querying WHOIS server");
        let reply = query_server(&server, self.port, domain, self.timeout).await?;
        let mut record = parse_reply(domain, &server, &reply)?;

        if !self.follow_referrals {
            return Ok(record);
        }

        if let Some(referral) = extract_referral(&reply).filter(|r| !r.eq_ignore_ascii_case(&server)) {
            debug!(referral = %referral, "Following registrar referral");
            // The registry reply already answers the question; a broken
            // registrar server only costs us the extra contact fields.
            match query_server(&referral, self.port, domain, self.timeout).await {
                Ok(referred) => match parse_reply(domain, &referral, &referred) {
                    Ok(mut thick) => {
                        thick.merge_missing(record);
                        record = thick;
                    }
                    Err(e) => debug!(error = %e, "Ignoring unusable referral reply"),
                },
                Err(e) => debug!(error = %e, "Referral query failed"),
            }
        }

        Ok(record)
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WhoisQuery for WhoisClient {
    async fn query(&self, domain: &str) -> Result<RawRecord, LookupError> {
        self.lookup(domain).await
    }
}

/// Send one query to a WHOIS server and read the full reply.
///
/// The whole exchange shares one deadline, `limit` from now. A server that
/// has sent something but keeps the socket open past the deadline is taken
/// to be done.
pub async fn query_server(
    server: &str,
    port: u16,
    query: &str,
    limit: Duration,
) -> Result<String, LookupError> {
    let now = Instant::now();
    let deadline = now.checked_add(limit).unwrap_or(now + FAR_FUTURE);

    let mut stream = timeout_at(deadline, TcpStream::connect((server, port)))
        .await
        .map_err(|_| LookupError::timeout(format!("connect to {}", server), limit))?
        .map_err(|e| {
            LookupError::network_with_source(format!("Failed to connect to {}", server), e.to_string())
        })?;

    timeout_at(deadline, stream.write_all(format!("{}\r\n", query).as_bytes()))
        .await
        .map_err(|_| LookupError::timeout(format!("write to {}", server), limit))?
        .map_err(|e| LookupError::network_with_source("Failed to send query", e.to_string()))?;

    let mut response = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        match timeout_at(deadline, stream.read(&mut buf)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                response.extend_from_slice(&buf[..n]);
                if response.len() > MAX_RESPONSE_SIZE {
                    return Err(LookupError::parse(format!(
                        "Response from {} exceeds {} bytes",
                        server, MAX_RESPONSE_SIZE
                    )));
                }
            }
            Ok(Err(e)) => {
                return Err(LookupError::network_with_source("Read error", e.to_string()));
            }
            Err(_) if !response.is_empty() => break,
            Err(_) => {
                return Err(LookupError::timeout(format!("read from {}", server), limit));
            }
        }
    }

    Ok(decode_reply(response))
}

/// Decode as UTF-8, falling back to Latin-1.
fn decode_reply(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Turn a text reply into a record, recognizing "no such domain" and throttling replies.
///
/// Those checks only apply when the reply carries no recognizable fields, so
/// legal boilerplate in a real record can't trigger them.
fn parse_reply(domain: &str, server: &str, reply: &str) -> Result<RawRecord, LookupError> {
    let record = RawRecord::from_whois_text(reply);
    if !record.is_empty() {
        return Ok(record);
    }

    let lower = reply.to_lowercase();
    if RATE_LIMIT_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Err(LookupError::rate_limited(server, first_line(reply)));
    }
    if NOT_FOUND_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Err(LookupError::not_found(domain));
    }

    Ok(record)
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no reply")
        .to_string()
}

/// Find the registrar WHOIS server a registry reply points at.
fn extract_referral(reply: &str) -> Option<String> {
    REFERRAL_PATTERNS.iter().find_map(|re| {
        let server = re.captures(reply)?.get(1)?.as_str();
        let server = server
            .trim_start_matches("whois://")
            .trim_start_matches("rwhois://")
            .split(':')
            .next()
            .unwrap_or("")
            .trim_end_matches('/')
            .to_lowercase();
        (!server.is_empty() && server.contains('.')).then_some(server)
    })
}
