//! Configuration module for Spidey
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use spidey::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spidey.toml")).unwrap();
//! println!("Checkpoint every {} pages", config.crawler.checkpoint_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_crawl_limits, validate_seed_url};
