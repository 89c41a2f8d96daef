//! Error handling for WHOIS lookup operations.
//!
//! This module defines the error type that covers the ways a single lookup
//! can fail, plus the configuration and file errors the front end runs into.
//! Lookup errors never escape the dispatcher: they are rendered into the
//! `error` field of the affected `DomainResult`.

use std::fmt;
use std::time::Duration;

/// Main error type for WHOIS lookup operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// Input did not pass the hostname grammar
    InvalidDomain { domain: String, reason: String },

    /// Network-related errors (connect, read, write)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// Timeout errors when a query takes too long
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The WHOIS reply could not be decoded or understood
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// The registry has no record for the domain
    NotFound { domain: String },

    /// The server refused to answer because of query volume
    RateLimited { server: String, message: String },

    /// No WHOIS server is known for the TLD
    ServerNotFound { tld: String },

    /// Bad config file contents or out-of-range settings
    ConfigError { message: String },

    /// File I/O errors when reading domain lists or config files
    FileError { path: String, message: String },

    /// Failures writing CSV/JSON exports
    ExportError { message: String },

    /// Anything else; should not normally surface
    Internal { message: String },
}

impl LookupError {
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Network error carrying the underlying cause.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
            content: None,
        }
    }

    /// Create a new not-found error.
    pub fn not_found<D: Into<String>>(domain: D) -> Self {
        Self::NotFound {
            domain: domain.into(),
        }
    }

    /// Create a new rate-limited error.
    pub fn rate_limited<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::RateLimited {
            server: server.into(),
            message: message.into(),
        }
    }

    pub fn server_not_found<T: Into<String>>(tld: T) -> Self {
        Self::ServerNotFound { tld: tld.into() }
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new export error.
    pub fn export<M: Into<String>>(message: M) -> Self {
        Self::ExportError {
            message: message.into(),
        }
    }

    /// Check if this error suggests the operation could succeed on a later attempt.
    ///
    /// Retrying is a caller concern; the dispatcher never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::ParseError { message, content: _ } => {
                write!(f, "Parse error: {}", message)
            }
            Self::NotFound { domain } => {
                write!(f, "No WHOIS record found for '{}'", domain)
            }
            Self::RateLimited { server, message } => {
                write!(f, "Rate limited by {}: {}", server, message)
            }
            Self::ServerNotFound { tld } => {
                write!(f, "No WHOIS server known for TLD '{}'", tld)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ExportError { message } => {
                write!(f, "Export error: {}", message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for LookupError {}

impl From<std::io::Error> for LookupError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => {
                Self::network_with_source("Connection failed", err.to_string())
            }
            _ => Self::Internal {
                message: format!("I/O error: {}", err),
            },
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON processing failed: {}", err),
            content: None,
        }
    }
}

impl From<toml::de::Error> for LookupError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LookupError::not_found("example.com");
        assert_eq!(err.to_string(), "No WHOIS record found for 'example.com'");

        let err = LookupError::timeout("WHOIS query", Duration::from_secs(10));
        assert_eq!(err.to_string(), "Timeout after 10s during: WHOIS query");

        let err = LookupError::network_with_source("Connection failed", "refused");
        assert_eq!(
            err.to_string(),
            "Network error: Connection failed (source: refused)"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(LookupError::network("reset").is_retryable());
        assert!(LookupError::timeout("query", Duration::from_secs(1)).is_retryable());
        assert!(LookupError::rate_limited("whois.example", "slow down").is_retryable());
        assert!(!LookupError::not_found("example.com").is_retryable());
        assert!(!LookupError::parse("garbage").is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            LookupError::from(refused),
            LookupError::NetworkError { .. }
        ));

        let timed_out = std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out");
        assert_eq!(
            LookupError::from(timed_out).to_string(),
            "Network error: Connection failed (source: connection timed out)"
        );

        let other = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(matches!(LookupError::from(other), LookupError::Internal { .. }));
    }
}
