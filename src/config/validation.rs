use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Longest fetch timeout accepted (seconds)
const MAX_FETCH_TIMEOUT_SECS: u64 = 600;

/// Most fetches allowed in flight at once
const MAX_CONCURRENT_FETCHES: u64 = 100;

/// Validates the entire configuration
///
/// Runs before any session is opened, so an invalid configuration never
/// partially starts a crawl.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_seed_url(&config.seed_url)?;

    validate_crawl_limits(
        config.checkpoint_interval as u64,
        config.keyword_count as u64,
        config.max_concurrent_fetches as u64,
    )?;

    if config.fetch_timeout_secs < 1 || config.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be between 1 and {}, got {}",
            MAX_FETCH_TIMEOUT_SECS, config.fetch_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the tuning values the crawl engine reads on every step
pub fn validate_crawl_limits(
    checkpoint_interval: u64,
    keyword_count: u64,
    max_concurrent_fetches: u64,
) -> Result<(), ConfigError> {
    if checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            checkpoint_interval
        )));
    }

    if keyword_count < 1 {
        return Err(ConfigError::Validation(format!(
            "keyword_count must be >= 1, got {}",
            keyword_count
        )));
    }

    if !(1..=MAX_CONCURRENT_FETCHES).contains(&max_concurrent_fetches) {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, max_concurrent_fetches
        )));
    }

    Ok(())
}

/// Validates a seed URL: must parse, use http(s) and name a host
pub fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
