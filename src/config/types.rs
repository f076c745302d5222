use crate::identity::IdentityPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Spidey
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from (and is re-seeded with on resume)
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Pages processed between two checkpoints
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Number of keywords kept per page
    #[serde(rename = "keyword-count", default = "default_keyword_count")]
    pub keyword_count: u32,

    /// Whole-request timeout for a single page fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: u32,

    /// How URLs are turned into page identifiers
    #[serde(default)]
    pub identity: IdentityPolicy,
}

impl CrawlerConfig {
    /// Creates a crawler configuration with default tuning for `seed_url`
    pub fn with_seed(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            checkpoint_interval: default_checkpoint_interval(),
            keyword_count: default_keyword_count(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            identity: IdentityPolicy::default(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn user_agent_string(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_checkpoint_interval() -> u32 {
    30
}

fn default_keyword_count() -> u32 {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> u32 {
    1
}

fn default_database_path() -> String {
    "db/spidey.db".to_string()
}
