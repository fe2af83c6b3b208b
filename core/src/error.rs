//! Error types for the ingredient API client.
//!
//! # Design
//! A closed set of three variants. `RateLimited` is split out from `Api` so
//! callers can branch on HTTP 429 without string matching; `Network` covers
//! timeouts and every transport-level fault and never carries a status.
//! None of them is retried here: the caller decides, usually with
//! `is_retryable`.

use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please wait before making more requests.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

pub type Result<T> = std::result::Result<T, ScannerError>;

/// A failed call. Every public operation yields either a decoded value or
/// exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScannerError {
    /// Non-2xx response other than 429. `message` is the response body, or
    /// `HTTP <status>` when the body was empty.
    #[error("{message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// The service answered 429.
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited { endpoint: String },

    /// Timeout, connection failure, or a body that could not be decoded.
    /// `timed_out` is set only when the deadline fired.
    #[error("Network error: {message}")]
    Network {
        endpoint: String,
        message: String,
        timed_out: bool,
    },
}

impl ScannerError {
    pub(crate) fn network(endpoint: &str, message: impl Into<String>) -> Self {
        ScannerError::Network {
            endpoint: endpoint.to_string(),
            message: message.into(),
            timed_out: false,
        }
    }

    pub(crate) fn timed_out(endpoint: &str) -> Self {
        ScannerError::Network {
            endpoint: endpoint.to_string(),
            message: TIMEOUT_MESSAGE.to_string(),
            timed_out: true,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ScannerError::Api { status, .. } => Some(*status),
            ScannerError::RateLimited { .. } => Some(429),
            ScannerError::Network { .. } => None,
        }
    }

    /// Request path (with query string) the failed call was made against.
    pub fn endpoint(&self) -> &str {
        match self {
            ScannerError::Api { endpoint, .. }
            | ScannerError::RateLimited { endpoint }
            | ScannerError::Network { endpoint, .. } => endpoint,
        }
    }

    /// The underlying message, without the `Network error:` display prefix.
    pub fn message(&self) -> &str {
        match self {
            ScannerError::Api { message, .. } | ScannerError::Network { message, .. } => message,
            ScannerError::RateLimited { .. } => RATE_LIMIT_MESSAGE,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ScannerError::RateLimited { .. } | ScannerError::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScannerError::Network { timed_out: true, .. })
    }
}
