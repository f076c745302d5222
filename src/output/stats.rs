//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::PageRecord;
use crate::storage::{CrawlStore, RunRecord, StorageResult};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Pages with a record, successful or not
    pub total_pages: u64,

    /// Pages whose fetch failed
    pub failed_pages: u64,

    /// URLs waiting in the persisted frontier
    pub queued_urls: u64,

    pub total_runs: u64,

    /// Failure counts keyed by failure kind
    pub failures_by_kind: BTreeMap<String, u64>,

    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(store: &dyn CrawlStore) -> StorageResult<CrawlStatistics> {
    let mut failures_by_kind = BTreeMap::new();
    for failure in store.get_failures()? {
        *failures_by_kind.entry(failure.kind).or_insert(0) += 1;
    }

    Ok(CrawlStatistics {
        total_pages: store.count_pages()?,
        failed_pages: store.count_failures()?,
        queued_urls: store.count_queued()?,
        total_runs: store.count_runs()?,
        failures_by_kind,
        latest_run: store.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages visited: {}", stats.total_pages);
    println!("  Failed fetches: {}", stats.failed_pages);
    println!("  URLs in frontier: {}", stats.queued_urls);
    println!("  Runs: {}", stats.total_runs);
    println!();

    if !stats.failures_by_kind.is_empty() {
        println!("Failures by Kind:");
        let mut kinds: Vec<_> = stats.failures_by_kind.iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in kinds {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Run (#{}):", run.id);
        println!("  Seed: {}", run.seed_url);
        println!("  Status: {}", run.status);
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Pages crawled: {}", run.pages_crawled);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched successfully)",
        success_rate(stats),
        stats.total_pages.saturating_sub(stats.failed_pages),
        stats.total_pages
    );
}

/// Prints a list of page records under a heading
pub fn print_pages(heading: &str, pages: &[PageRecord]) {
    println!("=== {} ({}) ===\n", heading, pages.len());
    for page in pages {
        println!("{}  {}", page.visited_at.format("%Y-%m-%d %H:%M:%S"), page.url);
        if !page.keywords.is_empty() {
            println!("    {}", page.keywords.join(", "));
        }
    }
}

fn success_rate(stats: &CrawlStatistics) -> f64 {
    if stats.total_pages == 0 {
        return 0.0;
    }
    let succeeded = stats.total_pages.saturating_sub(stats.failed_pages);
    (succeeded as f64 / stats.total_pages as f64) * 100.0
}
