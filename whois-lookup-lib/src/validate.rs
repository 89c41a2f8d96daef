//! Domain input validation.
//!
//! Raw domain strings from the command line or a file are trimmed, lowercased
//! and checked against a hostname grammar before any lookup is dispatched.
//! Invalid entries are dropped with a diagnostic; they never abort a batch.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    /// One or more labels of 1-63 alphanumerics (hyphens only inside), each
    /// followed by a dot, then an alphabetic TLD of at least two letters.
    static ref DOMAIN_PATTERN: Regex =
        Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$")
            .expect("domain pattern is a valid regex");
}

/// Outcome of validating a batch of raw inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedDomains {
    /// Normalized domains, in input order, duplicates kept
    pub valid: Vec<String>,
    /// Normalized forms of non-empty inputs that failed the grammar
    pub rejected: Vec<String>,
}

/// Check whether an already normalized (trimmed, lowercase) string is a valid domain.
pub fn is_valid_domain(domain: &str) -> bool {
    DOMAIN_PATTERN.is_match(domain)
}

/// Trim and lowercase a raw domain string.
pub fn normalize_domain(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate raw domains and keep both the accepted and the rejected entries.
///
/// Empty inputs are dropped silently. Repeated domains are not deduplicated:
/// each occurrence is looked up on its own.
pub fn validate_domains_detailed<S: AsRef<str>>(raw_domains: &[S]) -> ValidatedDomains {
    let mut outcome = ValidatedDomains::default();

    for raw in raw_domains {
        let domain = normalize_domain(raw.as_ref());
        if domain.is_empty() {
            continue;
        }

        if is_valid_domain(&domain) {
            outcome.valid.push(domain);
        } else {
            warn!(domain = %domain, "Skipping invalid domain");
            outcome.rejected.push(domain);
        }
    }

    outcome
}

/// Validate raw domains, returning the normalized valid ones in input order.
///
/// # Example
///
/// ```rust
/// use whois_lookup_lib::validate_domains;
///
/// let domains = validate_domains(&["  Example.COM ", "not a domain!!", ""]);
/// assert_eq!(domains, vec!["example.com"]);
/// ```
pub fn validate_domains<S: AsRef<str>>(raw_domains: &[S]) -> Vec<String> {
    validate_domains_detailed(raw_domains).valid
}

/// Split the contents of a domain list file into raw domain tokens.
///
/// Every whitespace-separated token on a line is a candidate; anything after
/// a `#` is a comment.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}
