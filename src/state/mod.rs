//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of a crawl session (idle, running, paused, exhausted, aborted)
//! - `CrawlSession`: the mutable aggregate threaded through every engine step
//! - `PageRecord` / `FailureRecord`: immutable results handed to the record store

mod crawl_state;
mod record;
mod session;

// Re-export main types
pub use crawl_state::CrawlState;
pub use record::{join_keywords, split_keywords, FailureRecord, PageRecord, KEYWORD_DELIMITER};
pub use session::CrawlSession;
