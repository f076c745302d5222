//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CrawlStore trait.
//! All statements are parameterized; URL and keyword text never becomes SQL.

use crate::identity::PageId;
use crate::state::{join_keywords, split_keywords, CrawlState, FailureRecord, PageRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CrawlStore, PersistenceError, StorageResult};
use crate::storage::RunRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // WAL keeps readers (stats, search) off the writer's back; FULL sync
        // makes every committed checkpoint survive power loss
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Page row exactly as stored
struct PageRow {
    page_id: String,
    visited_at: String,
    url: String,
    keywords: String,
}

impl PageRow {
    const COLUMNS: &'static str = "page_id, visited_at, url, keywords";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            page_id: row.get(0)?,
            visited_at: row.get(1)?,
            url: row.get(2)?,
            keywords: row.get(3)?,
        })
    }

    fn into_record(self) -> StorageResult<PageRecord> {
        Ok(PageRecord {
            id: parse_page_id("pages", &self.page_id)?,
            visited_at: parse_timestamp("pages", &self.visited_at)?,
            url: self.url,
            keywords: split_keywords(&self.keywords),
        })
    }
}

fn parse_page_id(table: &'static str, raw: &str) -> StorageResult<PageId> {
    PageId::from_hex(raw).ok_or_else(|| PersistenceError::Corrupt {
        table,
        message: format!("invalid page id '{}'", raw),
    })
}

fn parse_timestamp(table: &'static str, raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| PersistenceError::Corrupt {
            table,
            message: format!("invalid timestamp '{}': {}", raw, e),
        })
}

fn collect_pages(rows: Vec<PageRow>) -> StorageResult<Vec<PageRecord>> {
    rows.into_iter().map(PageRow::into_record).collect()
}

/// Replaces the frontier table contents
fn write_frontier(conn: &Connection, frontier: &[String]) -> StorageResult<()> {
    conn.execute("DELETE FROM queued_urls", [])?;

    let mut stmt = conn.prepare_cached("INSERT INTO queued_urls (position, url) VALUES (?1, ?2)")?;
    for (position, url) in frontier.iter().enumerate() {
        stmt.execute(params![position as i64, url])?;
    }

    Ok(())
}

/// Appends page and failure rows, skipping ids that are already stored
fn insert_records(
    conn: &Connection,
    records: &[PageRecord],
    failures: &[FailureRecord],
) -> StorageResult<()> {
    let mut page_stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO pages (page_id, visited_at, url, keywords) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for record in records {
        page_stmt.execute(params![
            record.id.to_hex(),
            record.visited_at.to_rfc3339(),
            record.url,
            join_keywords(&record.keywords),
        ])?;
    }

    let mut failure_stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO fetch_failures (page_id, url, failed_at, kind, reason)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for failure in failures {
        failure_stmt.execute(params![
            failure.id.to_hex(),
            failure.url,
            failure.failed_at.to_rfc3339(),
            failure.kind,
            failure.reason,
        ])?;
    }

    Ok(())
}

fn count(conn: &Connection, sql: &str) -> StorageResult<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

impl CrawlStore for SqliteStore {
    // ===== Frontier Store =====

    fn load_frontier(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM queued_urls ORDER BY position ASC")?;

        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }

    fn load_visited(&self) -> StorageResult<HashSet<PageId>> {
        let mut stmt = self.conn.prepare("SELECT page_id FROM pages")?;
        let raw_ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        raw_ids
            .iter()
            .map(|raw| parse_page_id("pages", raw))
            .collect()
    }

    fn checkpoint(
        &mut self,
        frontier: &[String],
        records: &[PageRecord],
        failures: &[FailureRecord],
    ) -> StorageResult<()> {
        // Dropping the transaction on any error rolls everything back
        let tx = self.conn.transaction()?;
        write_frontier(&tx, frontier)?;
        insert_records(&tx, records, failures)?;
        tx.commit()?;
        Ok(())
    }

    // ===== Page Record Store =====

    fn append_records(
        &mut self,
        records: &[PageRecord],
        failures: &[FailureRecord],
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        insert_records(&tx, records, failures)?;
        tx.commit()?;
        Ok(())
    }

    fn get_page(&self, id: &PageId) -> StorageResult<Option<PageRecord>> {
        let sql = format!("SELECT {} FROM pages WHERE page_id = ?1", PageRow::COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id.to_hex()], PageRow::from_row)
            .optional()?;

        row.map(PageRow::into_record).transpose()
    }

    fn recent_pages(&self, limit: usize) -> StorageResult<Vec<PageRecord>> {
        let sql = format!(
            "SELECT {} FROM pages ORDER BY rowid DESC LIMIT ?1",
            PageRow::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], PageRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        collect_pages(rows)
    }

    fn find_pages_by_keyword(&self, keyword: &str) -> StorageResult<Vec<PageRecord>> {
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        // Pad both sides with the delimiter so only whole tokens match
        let sql = format!(
            "SELECT {} FROM pages
             WHERE instr(' ' || keywords || ' ', ' ' || ?1 || ' ') > 0
             ORDER BY rowid ASC",
            PageRow::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![keyword], PageRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        collect_pages(rows)
    }

    fn get_failures(&self) -> StorageResult<Vec<FailureRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT page_id, url, failed_at, kind, reason FROM fetch_failures ORDER BY rowid ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(page_id, url, failed_at, kind, reason)| {
                Ok(FailureRecord {
                    id: parse_page_id("fetch_failures", &page_id)?,
                    url,
                    failed_at: parse_timestamp("fetch_failures", &failed_at)?,
                    kind,
                    reason,
                })
            })
            .collect()
    }

    // ===== Run Management =====

    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, seed_url, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, seed_url, config_hash, CrawlState::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: CrawlState,
        pages_crawled: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_crawled = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, pages_crawled as i64, run_id],
        )?;

        if updated == 0 {
            return Err(PersistenceError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, seed_url, config_hash, status, pages_crawled
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        seed_url: row.get(3)?,
                        config_hash: row.get(4)?,
                        // A run whose process died never got a final status
                        status: CrawlState::from_db_string(&row.get::<_, String>(5)?)
                            .unwrap_or(CrawlState::Running),
                        pages_crawled: row.get::<_, i64>(6)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn count_pages(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM pages")
    }

    fn count_failures(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM fetch_failures")
    }

    fn count_queued(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM queued_urls")
    }

    fn count_runs(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM runs")
    }

    // ===== Maintenance =====

    fn reset(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "
            DELETE FROM queued_urls;
            DELETE FROM pages;
            DELETE FROM fetch_failures;
        ",
        )?;
        tx.commit()?;
        Ok(())
    }
}
