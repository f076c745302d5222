//! Spidey: a resumable breadth-first web crawler
//!
//! This crate crawls outward from a seed URL in breadth-first order, extracts
//! outbound links and keyword frequencies from every page, and checkpoints
//! its frontier, visited set and page records to SQLite so an interrupted
//! crawl can resume without fetching any page twice.

pub mod config;
pub mod crawler;
pub mod fetcher;
pub mod frontier;
pub mod identity;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Spidey operations
#[derive(Debug, Error)]
pub enum SpideyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] storage::PersistenceError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Spidey operations
pub type Result<T> = std::result::Result<T, SpideyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlOutcome, CrawlReport};
pub use fetcher::{Document, FetchError, HttpFetcher, PageFetcher};
pub use identity::{identify, IdentityPolicy, PageId};
pub use state::{CrawlSession, CrawlState, PageRecord};
pub use storage::{CrawlStore, PersistenceError, SqliteStore};
