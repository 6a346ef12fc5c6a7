//! Error types for the hosting API client.

use thiserror::Error;

/// Main error type for hosting API operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Transport-level failure (connection, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status other than the one the operation requires.
    #[error("{operation}: expected status {expected}, got {actual}{}", fmt_body(.body))]
    UnexpectedStatus {
        operation: &'static str,
        expected: u16,
        actual: u16,
        body: String,
    },

    /// The response payload did not match the expected contract.
    #[error("{operation}: {detail}")]
    Contract {
        operation: &'static str,
        detail: String,
    },

    /// A bounded poll gave up without observing a ready value.
    #[error("{operation}: gave up after {attempts} attempts{}", .last.as_ref().map(|l| format!(" (last: {l})")).unwrap_or_default())]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        last: Option<String>,
    },

    /// A default header could not be encoded.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
}

fn fmt_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" (body: {body})")
    }
}

impl ForgeError {
    /// Build a contract violation for `operation`.
    pub fn contract(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Contract {
            operation,
            detail: detail.into(),
        }
    }

    /// Whether a retry could plausibly observe a different outcome.
    ///
    /// Freshly created resources surface as 404/409 until the host has
    /// finished initialising them; 5xx and connect/timeout failures are
    /// treated the same way.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::UnexpectedStatus { actual, .. } => {
                matches!(*actual, 404 | 409) || (500..600).contains(actual)
            }
            Self::Contract { .. } | Self::RetriesExhausted { .. } | Self::InvalidHeader(_) => {
                false
            }
        }
    }
}

/// Result type alias for hosting API operations.
pub type Result<T> = std::result::Result<T, ForgeError>;
