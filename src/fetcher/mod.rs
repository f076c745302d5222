//! Page fetching and document extraction
//!
//! This module turns a URL into a typed [`Document`]:
//! - [`PageFetcher`] is the capability the crawl engine consumes
//! - [`HttpFetcher`] implements it over `reqwest` with a bounded timeout
//! - [`extract_links`] and [`extract_keywords`] are the only queries the
//!   engine runs against a document
//!
//! Fetch failures are values, never panics or raw transport errors. The
//! engine records them and keeps crawling.

mod document;
mod http;

pub use document::{extract_keywords, extract_links, Document};
pub use http::{build_http_client, HttpFetcher};

use std::future::Future;
use thiserror::Error;

/// Why a page could not be turned into a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{url} is unreachable: {message}")]
    Unreachable { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    BadStatus { url: String, status: u16 },

    #[error("Could not parse {url}: {message}")]
    ParseFailure { url: String, message: String },
}

impl FetchError {
    /// Short stable name stored in the failure log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::Timeout { .. } => "timeout",
            Self::BadStatus { .. } => "bad_status",
            Self::ParseFailure { .. } => "parse_failure",
        }
    }

    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Unreachable { url, .. }
            | Self::Timeout { url }
            | Self::BadStatus { url, .. }
            | Self::ParseFailure { url, .. } => url,
        }
    }
}

/// Retrieves and parses pages
///
/// Implementations hold no per-call mutable state, so one fetcher can serve
/// several concurrent fetches through a shared reference.
pub trait PageFetcher {
    /// Fetches `url` and parses it into a [`Document`]
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Document, FetchError>> + Send;
}
