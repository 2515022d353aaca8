//! Database schema definitions
//!
//! The database is shared with the fetcher: it writes `raw_documents`, the
//! selector workers own `urls`.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl frontier and history; a URL row is never deleted so duplicates stay detectable
CREATE TABLE IF NOT EXISTS urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    source_url TEXT,
    depth INTEGER NOT NULL,
    state TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    processed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_urls_state_depth ON urls(state, depth);

-- Raw markup stored by the fetcher
CREATE TABLE IF NOT EXISTS raw_documents (
    url TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
