//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Frontier and visited-set persistence for resumption
//! - The append-only page record store and failure log
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{CrawlStore, PersistenceError, StorageResult};

use crate::state::CrawlState;
use std::path::Path;

/// Opens (creating if needed) the store at `path`
///
/// Missing parent directories are created first.
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    SqliteStore::new(path)
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub seed_url: String,
    pub config_hash: String,
    pub status: CrawlState,
    pub pages_crawled: u64,
}
