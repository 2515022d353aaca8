//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the `Frontier` and
//! `DocumentStore` traits. One connection is shared by all workers behind a
//! mutex; claiming a URL is a single `UPDATE ... RETURNING` statement so it
//! stays atomic even when several processes share the database file.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DocumentStore, Frontier, StorageError, StorageResult};
use crate::storage::{FrontierStats, UrlRecord, UrlState};
use crate::SelectorError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SelectorError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SelectorError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SelectorError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
    }

    /// Queues a seed URL at depth 0
    ///
    /// Returns `false` if the URL was already known.
    pub fn add_seed(&self, url: &str) -> StorageResult<bool> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO urls (url, source_url, depth, state, discovered_at)
             VALUES (?1, NULL, 0, ?2, ?3)",
            params![url, UrlState::Queued.to_db_string(), now],
        )?;
        Ok(inserted > 0)
    }

    /// Stores (or replaces) the raw markup for a URL
    pub fn store_document(&self, url: &str, content: &str) -> StorageResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR REPLACE INTO raw_documents (url, content, fetched_at) VALUES (?1, ?2, ?3)",
            params![url, content, now],
        )?;
        Ok(())
    }

    /// Returns URLs left `claimed` by a previous run to the queue
    ///
    /// Only safe to call before any worker starts.
    pub fn release_claimed(&self) -> StorageResult<usize> {
        let conn = self.lock()?;
        let released = conn.execute(
            "UPDATE urls SET state = ?1 WHERE state = ?2",
            params![
                UrlState::Queued.to_db_string(),
                UrlState::Claimed.to_db_string()
            ],
        )?;
        Ok(released)
    }

    /// Looks up a frontier record by URL
    pub fn get_url(&self, url: &str) -> StorageResult<Option<UrlRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, url, source_url, depth, state, discovered_at, processed_at
                 FROM urls WHERE url = ?1",
                params![url],
                |row| {
                    Ok(UrlRecord {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        source_url: row.get(2)?,
                        depth: row.get(3)?,
                        state: UrlState::from_db_string(&row.get::<_, String>(4)?)
                            .unwrap_or(UrlState::Queued),
                        discovered_at: row.get(5)?,
                        processed_at: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Counts URLs by state plus stored documents
    pub fn frontier_stats(&self) -> StorageResult<FrontierStats> {
        let conn = self.lock()?;
        let count_state = |state: UrlState| -> StorageResult<u64> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM urls WHERE state = ?1",
                params![state.to_db_string()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        };

        let queued = count_state(UrlState::Queued)?;
        let claimed = count_state(UrlState::Claimed)?;
        let processed = count_state(UrlState::Processed)?;
        let documents: i64 =
            conn.query_row("SELECT COUNT(*) FROM raw_documents", [], |row| row.get(0))?;

        Ok(FrontierStats {
            queued,
            claimed,
            processed,
            documents: documents as u64,
        })
    }
}

impl DocumentStore for SqliteStorage {
    fn find_by_url(&self, url: &str) -> StorageResult<Option<String>> {
        let conn = self.lock()?;
        let content = conn
            .query_row(
                "SELECT content FROM raw_documents WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }
}

impl Frontier for SqliteStorage {
    fn add(&self, url: &str, source_url: &str) -> StorageResult<()> {
        let conn = self.lock()?;

        // A source the frontier never saw is treated as a seed
        let source_depth: Option<i64> = conn
            .query_row(
                "SELECT depth FROM urls WHERE url = ?1",
                params![source_url],
                |row| row.get(0),
            )
            .optional()?;
        let depth = source_depth.unwrap_or(0) + 1;

        let now = Utc::now().to_rfc3339();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO urls (url, source_url, depth, state, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![url, source_url, depth, UrlState::Queued.to_db_string(), now],
        )?;

        if inserted == 0 {
            return Err(StorageError::DuplicateUrl(url.to_string()));
        }

        Ok(())
    }

    fn next_unprocessed(&self, max_depth: i64) -> StorageResult<Option<String>> {
        let conn = self.lock()?;
        let url = conn
            .query_row(
                "UPDATE urls SET state = ?1
                 WHERE id = (
                     SELECT id FROM urls
                     WHERE state = ?2 AND (?3 < 0 OR depth <= ?3)
                     ORDER BY id
                     LIMIT 1
                 )
                 RETURNING url",
                params![
                    UrlState::Claimed.to_db_string(),
                    UrlState::Queued.to_db_string(),
                    max_depth
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(url)
    }

    fn mark_processed(&self, url: &str) -> StorageResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE urls SET state = ?1, processed_at = COALESCE(processed_at, ?2) WHERE url = ?3",
            params![UrlState::Processed.to_db_string(), now, url],
        )?;
        Ok(())
    }
}
