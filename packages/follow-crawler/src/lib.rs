//! Incremental follow-graph crawler.
//!
//! One invocation refreshes one account: pick the least-recently
//! refreshed known account (or an initial seed handle), re-read its
//! profile and follow list from the remote directory, and commit the
//! fresh edge snapshot to the local store. Invoked repeatedly by an
//! external scheduler, this walks the whole reachable graph fairly.

pub mod config;
pub mod cycle;
pub mod directory;
pub mod error;
pub mod storage;

// Re-exports for clean API
pub use config::Config;
pub use cycle::{run_cycle, CycleOutcome};
pub use directory::RemoteDirectory;
pub use error::{CrawlerError, Result, StorageError};
pub use storage::{GraphStore, SqliteGraphStore, StatsSample};
