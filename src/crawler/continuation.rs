//! Hooks that decide whether a crawl keeps going
//!
//! [`Continuation`] is asked after every checkpoint. [`StopSignal`] can be
//! raised from anywhere (a Ctrl-C handler, another task) and is observed
//! between batches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Asked after each checkpoint whether the crawl should continue
pub trait Continuation {
    /// `pages_crawled` counts every page processed in this session so far
    fn should_continue(&mut self, pages_crawled: u64) -> bool;
}

impl<F> Continuation for F
where
    F: FnMut(u64) -> bool,
{
    fn should_continue(&mut self, pages_crawled: u64) -> bool {
        self(pages_crawled)
    }
}

/// Never pauses; the crawl runs until the frontier is exhausted
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysContinue;

impl Continuation for AlwaysContinue {
    fn should_continue(&mut self, _pages_crawled: u64) -> bool {
        true
    }
}

/// Pauses at the first checkpoint where at least `limit` pages were crawled
#[derive(Debug, Clone, Copy)]
pub struct StopAfter {
    limit: u64,
}

impl StopAfter {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Continuation for StopAfter {
    fn should_continue(&mut self, pages_crawled: u64) -> bool {
        pages_crawled < self.limit
    }
}

/// Shared stop flag
///
/// Clones share one flag. Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
