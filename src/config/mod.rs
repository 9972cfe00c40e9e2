//! Configuration module for Gleaner
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use gleaner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gleaner.toml")).unwrap();
//! println!("Default provider: {}", config.llm.default_provider);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AzureSettings, Config, CrawlDefaults, LlmConfig, ProviderSettings, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
