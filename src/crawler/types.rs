//! Crawl configuration and per-page data types

use crate::config::CrawlDefaults;
use crate::llm::LlmProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Longest pause a rate limit can impose between two fetches
pub const MAX_RATE_LIMIT_DELAY: Duration = Duration::from_secs(3600);

/// Structured extraction output: string keys mapped to arbitrary JSON values
pub type StructuredData = serde_json::Map<String, serde_json::Value>;

/// How a crawl request is served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrawlMode {
    /// Extract from a single page
    #[default]
    Smart,
    /// Breadth-first crawl over same-site links
    Deep,
    /// Recognized but not implemented
    Search,
    /// Recognized but not implemented
    Custom,
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Smart => "smart",
            Self::Deep => "deep",
            Self::Search => "search",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for CrawlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smart" | "smart_scraper" => Ok(Self::Smart),
            "deep" | "deep_scraper" => Ok(Self::Deep),
            "search" | "search_scraper" => Ok(Self::Search),
            "custom" | "custom_scraper" => Ok(Self::Custom),
            other => Err(format!("unknown crawl mode: {}", other)),
        }
    }
}

/// How a page is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// Plain HTTP GET; scripts are not executed
    #[default]
    Static,
    /// Load in a headless browser and let scripts settle first
    ScriptRendering,
}

impl FetchStrategy {
    pub fn from_flag(script_rendering: bool) -> Self {
        if script_rendering {
            Self::ScriptRendering
        } else {
            Self::Static
        }
    }
}

/// Configuration for one crawl request
#[derive(Debug, Clone, Serialize)]
pub struct CrawlConfig {
    pub url: String,
    pub mode: CrawlMode,

    /// Extraction task handed to the model
    pub prompt: String,

    pub max_depth: u32,

    /// Upper bound on returned results; at least 1
    pub max_pages: usize,

    /// Per-fetch timeout (milliseconds)
    pub timeout_ms: u64,

    pub strategy: FetchStrategy,
    pub headers: BTreeMap<String, String>,

    /// Narrows the text handed to the model to the first match of this selector
    pub css_selector: Option<String>,

    pub follow_links: bool,

    /// Regular expression a link must fully match to be followed
    pub link_pattern: Option<String>,

    pub user_agent: String,

    /// Requests per second; zero or negative disables throttling
    pub rate_limit: f64,

    /// Model provider; the factory default is used when absent
    pub provider: Option<LlmProvider>,

    pub created_at: DateTime<Utc>,
}

impl CrawlConfig {
    /// Creates a smart-mode config with default budgets
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::from_defaults(&CrawlDefaults::default(), url, prompt)
    }

    /// Creates a smart-mode config seeded from file defaults
    pub fn from_defaults(
        defaults: &CrawlDefaults,
        url: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            mode: CrawlMode::Smart,
            prompt: prompt.into(),
            max_depth: defaults.max_depth,
            max_pages: defaults.max_pages.max(1),
            timeout_ms: defaults.timeout_ms,
            strategy: FetchStrategy::from_flag(defaults.script_rendering),
            headers: defaults.headers.clone(),
            css_selector: defaults.css_selector.clone(),
            follow_links: defaults.follow_links,
            link_pattern: defaults.link_pattern.clone(),
            user_agent: defaults.user_agent.clone(),
            rate_limit: defaults.rate_limit,
            provider: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_mode(mut self, mode: CrawlMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets both budgets; `max_pages` is clamped to at least 1
    pub fn with_budget(mut self, max_depth: u32, max_pages: usize) -> Self {
        self.max_depth = max_depth;
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: f64) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_link_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.link_pattern = Some(pattern.into());
        self
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Derives the config for one page of a deep crawl
    ///
    /// Only the fetch and extraction settings carry over; budgets and link
    /// following belong to the parent crawl.
    pub fn for_page(&self, url: &str) -> Self {
        Self {
            url: url.to_string(),
            mode: CrawlMode::Smart,
            prompt: self.prompt.clone(),
            max_depth: 0,
            max_pages: 1,
            timeout_ms: self.timeout_ms,
            strategy: self.strategy,
            headers: self.headers.clone(),
            css_selector: self.css_selector.clone(),
            follow_links: false,
            link_pattern: None,
            user_agent: self.user_agent.clone(),
            rate_limit: 0.0,
            provider: self.provider,
            created_at: Utc::now(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay between consecutive page fetches, or None when throttling is off
    ///
    /// Very small rates are capped at `MAX_RATE_LIMIT_DELAY`.
    pub fn rate_limit_delay(&self) -> Option<Duration> {
        if self.rate_limit > 0.0 && self.rate_limit.is_finite() {
            let delay = Duration::try_from_secs_f64(1.0 / self.rate_limit)
                .unwrap_or(MAX_RATE_LIMIT_DELAY);
            Some(delay.min(MAX_RATE_LIMIT_DELAY))
        } else {
            None
        }
    }
}

/// Normalized content of a fetched page
///
/// `success == false` means only `url` and `error_message` are meaningful.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub url: String,
    pub html: String,

    /// Whitespace-normalized text of the whole document
    pub text: String,

    pub title: Option<String>,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,

    /// Anchor links resolved against `url`, in document order
    pub links: Vec<String>,

    pub success: bool,
    pub error_message: Option<String>,
}

impl PageContent {
    /// Failure marker for a page that could not be fetched
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            error_message: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Outcome of crawling one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub url: String,

    /// Free-text extraction produced by the model
    pub content: String,

    pub raw_html: String,
    pub structured_data: StructuredData,

    /// `title` and `statusCode`, as strings
    pub metadata: BTreeMap<String, String>,

    /// Links found on the page, in document order, unfiltered
    pub links: Vec<String>,

    pub extracted_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

impl PageResult {
    /// Result for a page whose pipeline stopped early
    pub fn failure(url: impl Into<String>, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            url: url.into(),
            content: String::new(),
            raw_html: String::new(),
            structured_data: StructuredData::new(),
            metadata: BTreeMap::new(),
            links: Vec::new(),
            extracted_at: Utc::now(),
            duration_ms,
            success: false,
            error_message: Some(error.into()),
        }
    }
}
