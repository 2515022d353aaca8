use indexmap::IndexMap;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Selector
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub worker: WorkerConfig,
    pub storage: StorageConfig,
    /// Absent section means nothing is excluded
    #[serde(rename = "same-domain-selector", default)]
    pub selector: Option<SelectorConfig>,
}

/// Worker loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Maximum link-hops from a seed to still process (-1 means unbounded)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: i64,

    /// Number of workers sharing the frontier
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Length of one backoff time unit (milliseconds)
    #[serde(rename = "backoff-unit-ms", default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Backoff cap, in time units
    #[serde(rename = "max-backoff", default = "default_max_backoff")]
    pub max_backoff: u32,
}

impl WorkerConfig {
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            workers: default_workers(),
            backoff_unit_ms: default_backoff_unit_ms(),
            max_backoff: default_max_backoff(),
        }
    }
}

fn default_max_depth() -> i64 {
    -1
}

fn default_workers() -> usize {
    1
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_max_backoff() -> u32 {
    30
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database shared with the fetcher
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// The `[same-domain-selector]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorConfig {
    /// Domain suffix -> path segments to block, in file order
    #[serde(default)]
    pub exclude: Option<IndexMap<String, Vec<String>>>,
}
