//! Storage traits and error types
//!
//! This module defines the collaborator interfaces the selector and worker
//! depend on, and the errors they can raise.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The URL is already known to the frontier (queued, claimed, or processed)
    #[error("Duplicate URL: {0}")]
    DuplicateUrl(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Raw documents written by the fetcher, looked up by URL
pub trait DocumentStore: Send + Sync {
    /// Returns the stored markup for a URL, or `None` if nothing was stored
    fn find_by_url(&self, url: &str) -> StorageResult<Option<String>>;
}

/// The shared crawl frontier
///
/// Implementations must be safe to share between workers:
/// - `add` checks for duplicates atomically across the whole crawl history
/// - `next_unprocessed` never hands the same URL to two callers
/// - `mark_processed` is idempotent
pub trait Frontier: Send + Sync {
    /// Queues `url`, discovered on `source_url`
    ///
    /// Fails with [`StorageError::DuplicateUrl`] if the URL was ever queued before.
    fn add(&self, url: &str, source_url: &str) -> StorageResult<()>;

    /// Claims the oldest queued URL whose depth is within `max_depth`
    ///
    /// A negative `max_depth` means unbounded.
    fn next_unprocessed(&self, max_depth: i64) -> StorageResult<Option<String>>;

    /// Marks a URL as processed
    fn mark_processed(&self, url: &str) -> StorageResult<()>;
}
