//! Database schema definitions
//!
//! Table creation is idempotent and runs every time a store is opened.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    seed_url TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_crawled INTEGER NOT NULL DEFAULT 0
);

-- One row per visited page; failed fetches carry an empty keyword list
CREATE TABLE IF NOT EXISTS pages (
    page_id TEXT PRIMARY KEY,
    visited_at TEXT NOT NULL,
    url TEXT NOT NULL,
    keywords TEXT NOT NULL
);

-- Crawl frontier, rewritten at every checkpoint
CREATE TABLE IF NOT EXISTS queued_urls (
    position INTEGER PRIMARY KEY,
    url TEXT NOT NULL
);

-- Why a visited page has no content
CREATE TABLE IF NOT EXISTS fetch_failures (
    page_id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    failed_at TEXT NOT NULL,
    kind TEXT NOT NULL,
    reason TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{params, Connection};

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["runs", "pages", "queued_urls", "fetch_failures"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
