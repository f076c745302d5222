//! Crawl engine and its control hooks
//!
//! This module contains the core crawling logic:
//! - The state machine that moves a session from idle to a terminal state
//! - Batched, optionally concurrent fetching with results applied in order
//! - Mandatory periodic checkpointing
//! - Continuation and stop hooks for pausing a crawl

mod continuation;
mod engine;

pub use continuation::{AlwaysContinue, Continuation, StopAfter, StopSignal};
pub use engine::{CrawlEngine, CrawlOutcome, CrawlReport, EngineSettings, Step};
