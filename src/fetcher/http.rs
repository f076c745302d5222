//! HTTP fetcher implementation
//!
//! Wraps a `reqwest` client: one GET per page, redirects followed up to a
//! fixed limit, every failure mapped onto [`FetchError`].

use crate::config::{Config, UserAgentConfig};
use crate::fetcher::{Document, FetchError, PageFetcher};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops before a fetch is treated as unreachable
const MAX_REDIRECTS: usize = 10;

/// Upper bound on connection setup, independent of the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout applied to every fetch
///
/// # Example
///
/// ```no_run
/// use spidey::config::UserAgentConfig;
/// use spidey::fetcher::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "Spidey".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent_string())
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the user agent and timeout settings in `config`
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.crawler.fetch_timeout())?;
        Ok(Self::new(client))
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        tracing::info!("Accessing: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(content_type) = content_type.as_deref() {
            if !is_textual(content_type) {
                return Err(FetchError::ParseFailure {
                    url: url.to_string(),
                    message: format!("unsupported content type {}", content_type),
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        Ok(Document::parse(&body))
    }
}

/// Returns true for content types the HTML parser can make sense of
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/xhtml+xml"
}

fn classify_transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Unreachable {
            url: url.to_string(),
            message: "connection failed".to_string(),
        }
    } else if error.is_redirect() {
        FetchError::Unreachable {
            url: url.to_string(),
            message: format!("more than {} redirects", MAX_REDIRECTS),
        }
    } else {
        FetchError::Unreachable {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
