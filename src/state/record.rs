use crate::fetcher::FetchError;
use crate::identity::PageId;
use chrono::{DateTime, Utc};

/// Separator between keywords in the persisted `keywords` column
///
/// Keywords come from whitespace splitting and never contain a space, so
/// joining with one is lossless.
pub const KEYWORD_DELIMITER: &str = " ";

/// Result of visiting one page
///
/// A page whose fetch failed still gets a record; its keyword list is empty
/// and a matching [`FailureRecord`] says why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: PageId,
    pub visited_at: DateTime<Utc>,
    pub url: String,
    pub keywords: Vec<String>,
}

impl PageRecord {
    pub fn new(id: PageId, url: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            id,
            visited_at: Utc::now(),
            url: url.into(),
            keywords,
        }
    }

    /// The record written for a page that could not be fetched
    pub fn failed(id: PageId, url: impl Into<String>) -> Self {
        Self::new(id, url, Vec::new())
    }

    /// Persisted form of the keyword list
    pub fn keywords_joined(&self) -> String {
        join_keywords(&self.keywords)
    }
}

/// Failure log entry for a page that was marked visited without content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub id: PageId,
    pub url: String,
    pub failed_at: DateTime<Utc>,
    /// One of the `FetchError::kind` names
    pub kind: String,
    pub reason: String,
}

impl FailureRecord {
    pub fn from_error(id: PageId, error: &FetchError) -> Self {
        Self {
            id,
            url: error.url().to_string(),
            failed_at: Utc::now(),
            kind: error.kind().to_string(),
            reason: error.to_string(),
        }
    }
}

pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(KEYWORD_DELIMITER)
}

pub fn split_keywords(joined: &str) -> Vec<String> {
    joined
        .split(KEYWORD_DELIMITER)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
