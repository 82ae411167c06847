//! Typed errors for the crawler.
//!
//! Uses `thiserror` for library errors (not `anyhow`); `anyhow` appears
//! only at the binary entry point.

use thiserror::Error;
use twitter_client::TwitterError;

/// Errors that abort a crawl run.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// Empty store and no seed handle supplied
    #[error("store is empty and no seed handle was given; pass an initial handle")]
    NoSeed,

    /// A seed handle that fails to resolve is a usage problem, not a deletion
    #[error("seed handle {handle:?} does not resolve to any account")]
    SeedNotFound { handle: String },

    /// Remote directory failure, surfaced after the retry ceiling
    #[error("remote directory error: {0}")]
    Remote(#[from] TwitterError),

    /// Storage failure; the enclosing transaction was rolled back
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the durable graph store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored account snapshot is not valid JSON
    #[error("invalid stored snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Stored timestamp is not valid RFC 3339
    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
