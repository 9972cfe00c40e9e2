//! Crawler module for page fetching and model-backed extraction
//!
//! This module contains the core crawling logic, including:
//! - Static and script-rendering page fetching
//! - HTML parsing, link extraction and CSS-selector helpers
//! - The single-page pipeline ([`SmartCrawler`])
//! - Bounded breadth-first crawling ([`DeepCrawler`])
//! - Mode dispatch ([`Orchestrator`])

mod deep;
mod fetcher;
mod orchestrator;
mod parser;
mod render;
mod smart;
mod types;

pub use deep::DeepCrawler;
pub use fetcher::{build_http_client, PageFetcher};
pub use orchestrator::Orchestrator;
pub use parser::{
    extract_links, extract_main_content, parse_html, select_map, select_text, ParsedPage,
};
pub use smart::SmartCrawler;
pub use types::{
    CrawlConfig, CrawlMode, FetchStrategy, PageContent, PageResult, StructuredData,
};

use async_trait::async_trait;

/// Produces the result for one page of a crawl
///
/// The deep crawler drives an implementation of this trait for every URL it
/// visits. Implementations never fail; errors are reported in the result.
#[async_trait]
pub trait PageCrawler: Send + Sync {
    async fn crawl_page(&self, config: &CrawlConfig) -> PageResult;
}
