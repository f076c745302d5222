//! Output module for reporting on crawl results
//!
//! This module handles:
//! - Loading statistics from the record store
//! - Printing statistics, search hits and run summaries

pub mod stats;

pub use stats::{load_statistics, print_pages, print_statistics, CrawlStatistics};

use crate::crawler::{CrawlOutcome, CrawlReport};

/// Prints the summary of a finished crawl session
pub fn print_report(report: &CrawlReport) {
    let outcome = match report.outcome {
        CrawlOutcome::Paused => "paused (run again to resume)",
        CrawlOutcome::Exhausted => "exhausted (nothing left to crawl)",
    };

    println!("=== Run #{} {} ===", report.run_id, outcome);
    println!("  Pages crawled: {}", report.pages_crawled);
    println!("  Failed fetches: {}", report.pages_failed);
    println!("  Left in frontier: {}", report.frontier_remaining);
}
