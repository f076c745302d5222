use crate::fetcher::FetchError;
use crate::frontier::Frontier;
use crate::identity::PageId;
use crate::state::{FailureRecord, PageRecord};

/// The mutable aggregate of one crawl session
///
/// Owned by value: the engine takes it into each step and hands it back, so
/// nothing else can mutate the frontier or the pending buffers behind its
/// back. Pending buffers hold everything processed since the last
/// checkpoint and are cleared once that checkpoint commits.
#[derive(Debug)]
pub struct CrawlSession {
    pub seed_url: String,
    pub frontier: Frontier,
    pub pending_records: Vec<PageRecord>,
    pub pending_failures: Vec<FailureRecord>,
    pub pages_since_checkpoint: u32,

    /// Pages processed in this session, successful or not
    pub pages_crawled: u64,

    /// Pages in this session whose fetch failed
    pub pages_failed: u64,
}

impl CrawlSession {
    pub fn new(seed_url: impl Into<String>, frontier: Frontier) -> Self {
        Self {
            seed_url: seed_url.into(),
            frontier,
            pending_records: Vec::new(),
            pending_failures: Vec::new(),
            pages_since_checkpoint: 0,
            pages_crawled: 0,
            pages_failed: 0,
        }
    }

    /// Marks a fetched page visited, queues its unvisited links and buffers its record
    ///
    /// Returns the number of links that were newly queued.
    pub fn record_success(&mut self, id: PageId, url: &str, keywords: Vec<String>, links: Vec<String>) -> usize {
        let record = PageRecord::new(id, url, keywords);
        self.frontier.mark_visited(id);

        let mut queued = 0;
        for link in links {
            if self.frontier.enqueue(link) {
                queued += 1;
            }
        }

        self.pending_records.push(record);
        self.count_page();
        queued
    }

    /// Marks a failed page visited so it is never retried, and buffers the
    /// empty-keyword record plus a failure log entry
    pub fn record_failure(&mut self, id: PageId, url: &str, error: &FetchError) {
        self.frontier.mark_visited(id);
        self.pending_records.push(PageRecord::failed(id, url));
        self.pending_failures.push(FailureRecord::from_error(id, error));
        self.pages_failed += 1;
        self.count_page();
    }

    /// True when at least `interval` pages were processed since the last checkpoint
    pub fn checkpoint_due(&self, interval: u32) -> bool {
        self.pages_since_checkpoint >= interval
    }

    /// Drops the pending buffers after they were made durable
    pub fn clear_pending(&mut self) {
        self.pending_records.clear();
        self.pending_failures.clear();
        self.pages_since_checkpoint = 0;
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_records.is_empty() || !self.pending_failures.is_empty()
    }

    fn count_page(&mut self) {
        self.pages_since_checkpoint += 1;
        self.pages_crawled += 1;
    }
}
