//! Storage module for the crawl frontier and raw documents
//!
//! This module handles all database operations for the selector, including:
//! - SQLite database initialization and schema management
//! - The shared frontier queue with crawl-wide duplicate detection
//! - Depth tracking for discovered URLs
//! - Raw document lookup for pages the fetcher already stored

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{DocumentStore, Frontier, StorageError, StorageResult};

/// Represents a URL known to the frontier
#[derive(Debug, Clone)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub source_url: Option<String>,
    pub depth: i64,
    pub state: UrlState,
    pub discovered_at: String,
    pub processed_at: Option<String>,
}

/// Lifecycle of a frontier URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Waiting for a worker
    Queued,
    /// Handed to a worker, not yet marked processed
    Claimed,
    /// Links extracted and submitted
    Processed,
}

impl UrlState {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Claimed => "claimed",
            Self::Processed => "processed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "claimed" => Some(Self::Claimed),
            "processed" => Some(Self::Processed),
            _ => None,
        }
    }
}

/// Frontier counts for `--stats`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierStats {
    pub queued: u64,
    pub claimed: u64,
    pub processed: u64,
    pub documents: u64,
}

impl FrontierStats {
    pub fn total_urls(&self) -> u64 {
        self.queued + self.claimed + self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_state_roundtrip() {
        for state in &[UrlState::Queued, UrlState::Claimed, UrlState::Processed] {
            let parsed = UrlState::from_db_string(state.to_db_string());
            assert_eq!(Some(*state), parsed);
        }
    }

    #[test]
    fn test_url_state_invalid() {
        assert_eq!(UrlState::from_db_string("invalid"), None);
    }

    #[test]
    fn test_total_urls() {
        let stats = FrontierStats {
            queued: 3,
            claimed: 1,
            processed: 5,
            documents: 4,
        };
        assert_eq!(stats.total_urls(), 9);
    }
}
