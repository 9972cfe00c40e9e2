//! Gleaner: LLM-assisted web extraction
//!
//! This crate fetches web pages, hands their content to a language model to
//! extract free text and structured data, and optionally follows same-site
//! links in a bounded breadth-first crawl.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod llm;
pub mod output;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

/// Main error type for Gleaner operations
#[derive(Debug, Error)]
pub enum GleanerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("{0}")]
    Extraction(#[from] extract::ExtractionError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Gleaner operations
pub type Result<T> = std::result::Result<T, GleanerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    CrawlConfig, CrawlMode, DeepCrawler, FetchStrategy, Orchestrator, PageContent, PageCrawler,
    PageFetcher, PageResult, SmartCrawler,
};
pub use extract::{ContentExtractor, ExtractionError};
pub use llm::{ChatModel, ChatModelFactory, LlmClientFactory, LlmError, LlmProvider};
pub use output::CrawlSummary;
