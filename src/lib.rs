//! Sumi-Selector: same-domain link selection for crawl workers
//!
//! This crate takes documents that an external fetcher has already stored,
//! discovers the links on them, keeps the ones that stay on the page's own
//! domain and pass the per-domain exclusion rules, and feeds those back into
//! a shared frontier queue. It also provides the worker loop that drains the
//! frontier with depth limits, idle backoff, and graceful shutdown.

pub mod config;
pub mod crawler;
pub mod policy;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Selector operations
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("No stored document for {url}")]
    MissingDocument { url: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain suffix: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Result type alias for Sumi-Selector operations
pub type Result<T> = std::result::Result<T, SelectorError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEdge, CrawlWorker, SelectionPipeline, WorkerHandle, WorkerState};
pub use policy::ExclusionPolicy;
pub use url::{extract_domain, same_domain};
