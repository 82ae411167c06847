//! Error types for the Twitter client.

use thiserror::Error;

/// Result type for Twitter client operations.
pub type Result<T> = std::result::Result<T, TwitterError>;

/// Twitter client errors.
#[derive(Debug, Error)]
pub enum TwitterError {
    /// Configuration error (missing bearer token)
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connection refused, timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the API
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Retry ceiling exceeded; carries the final transient failure
    #[error("giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<TwitterError>,
    },
}

impl TwitterError {
    /// Transient failures are retried with backoff; everything else aborts
    /// the call immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, TwitterError::Network(_) | TwitterError::Api { .. })
    }
}
