//! Database schema definitions
//!
//! This module contains the SQL schemas for the database backend and for the
//! per-seed result cache.

/// SQL schema for the database backend
pub const BACKEND_SCHEMA_SQL: &str = r#"
-- Cached payloads, one row per fetched URL
CREATE TABLE IF NOT EXISTS content (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL,
    body BLOB NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_content_key ON content(key);

-- Requested URL -> final URL after HTTP redirects
CREATE TABLE IF NOT EXISTS redirects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_url TEXT NOT NULL,
    to_url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_redirects_from ON redirects(from_url);

-- URLs that failed with a transport error or an HTTP error status
CREATE TABLE IF NOT EXISTS errors (
    url TEXT PRIMARY KEY,
    recorded_at TEXT NOT NULL
);
"#;

/// SQL schema for the per-seed result cache
pub const RESULTS_SCHEMA_SQL: &str = r#"
-- Seeds whose complete crawl result is stored
CREATE TABLE IF NOT EXISTS crawl_seeds (
    seed TEXT PRIMARY KEY,
    stored_at TEXT NOT NULL
);

-- Documents of each stored seed, in discovery order
CREATE TABLE IF NOT EXISTS crawl_documents (
    seed TEXT NOT NULL REFERENCES crawl_seeds(seed),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    body BLOB NOT NULL,
    PRIMARY KEY (seed, position)
);
"#;

/// Initializes the backend schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_backend_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(BACKEND_SCHEMA_SQL)
}

/// Initializes the result cache schema
pub fn initialize_results_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(RESULTS_SCHEMA_SQL)
}
