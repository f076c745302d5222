//! Storage traits and error types

use crate::identity::PageId;
use crate::state::{CrawlState, FailureRecord, PageRecord};
use crate::storage::RunRecord;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur while reading or writing durable crawl state
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt row in {table}: {message}")]
    Corrupt { table: &'static str, message: String },

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, PersistenceError>;

/// Durable home of the frontier, the visited set and the page records
///
/// Writes that belong together go through [`CrawlStore::checkpoint`], which
/// must be all-or-nothing.
pub trait CrawlStore {
    // ===== Frontier Store =====

    /// Loads the persisted frontier in queue order
    fn load_frontier(&self) -> StorageResult<Vec<String>>;

    /// Loads the ids of every visited page
    fn load_visited(&self) -> StorageResult<HashSet<PageId>>;

    /// Atomically replaces the frontier and appends page and failure records
    ///
    /// Records whose id is already stored are skipped, so replaying a
    /// checkpoint is harmless.
    fn checkpoint(
        &mut self,
        frontier: &[String],
        records: &[PageRecord],
        failures: &[FailureRecord],
    ) -> StorageResult<()>;

    // ===== Page Record Store =====

    /// Appends page and failure records in one transaction
    fn append_records(
        &mut self,
        records: &[PageRecord],
        failures: &[FailureRecord],
    ) -> StorageResult<()>;

    /// Gets a page record by id
    fn get_page(&self, id: &PageId) -> StorageResult<Option<PageRecord>>;

    /// Most recently stored records first
    fn recent_pages(&self, limit: usize) -> StorageResult<Vec<PageRecord>>;

    /// Pages whose keyword list contains `keyword` exactly
    fn find_pages_by_keyword(&self, keyword: &str) -> StorageResult<Vec<PageRecord>>;

    /// All failure log entries, oldest first
    fn get_failures(&self) -> StorageResult<Vec<FailureRecord>>;

    // ===== Run Management =====

    /// Creates a new run in the `running` state and returns its id
    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Records how a run ended
    fn finish_run(&mut self, run_id: i64, status: CrawlState, pages_crawled: u64)
        -> StorageResult<()>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    fn count_pages(&self) -> StorageResult<u64>;

    fn count_failures(&self) -> StorageResult<u64>;

    fn count_queued(&self) -> StorageResult<u64>;

    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Maintenance =====

    /// Deletes the frontier, page records and failure log
    fn reset(&mut self) -> StorageResult<()>;
}
