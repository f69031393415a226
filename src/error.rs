//! Error types for cert-harvest
//!
//! This module provides error handling for the library, including:
//! - Request-level failures (timeout, transport, HTTP status) with the
//!   offending URL attached
//! - Payload decode failures for endpoint responses
//! - I/O errors from CSV output

use thiserror::Error;

/// Result type alias for cert-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cert-harvest
///
/// Each variant carries enough context to diagnose which request or file
/// operation went wrong without consulting surrounding logs.
#[derive(Debug, Error)]
pub enum Error {
    /// Request exceeded its per-request time limit
    #[error("request timed out after {limit_secs}s: {url}")]
    Timeout {
        /// The URL that timed out
        url: String,
        /// The per-request limit that was exceeded, in seconds
        limit_secs: u64,
    },

    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("network error for {url}: {source}")]
    Network {
        /// The URL being fetched when the failure occurred
        url: String,
        /// The underlying transport error
        source: reqwest::Error,
    },

    /// Endpoint answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// The HTTP status code returned
        status: u16,
        /// The URL that returned it
        url: String,
    },

    /// Endpoint payload did not match the expected shape
    #[error("malformed payload from {url}: {source}")]
    Payload {
        /// The URL whose response failed to decode
        url: String,
        /// The underlying decode error
        source: serde_json::Error,
    },

    /// Failed to construct the HTTP client
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify a reqwest send-phase error, attaching the request URL.
    ///
    /// Timeouts are promoted to [`Error::Timeout`] with the configured limit
    /// so the diagnostic names the deadline that was blown; everything else
    /// (connect, DNS, TLS, body) stays a [`Error::Network`].
    pub(crate) fn from_request(url: &str, limit_secs: u64, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Error::Timeout {
                url: url.to_string(),
                limit_secs,
            }
        } else {
            Error::Network {
                url: url.to_string(),
                source,
            }
        }
    }

    /// True for errors caused by the request deadline elapsing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}
