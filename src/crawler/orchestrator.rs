//! Entry point dispatching crawl requests by mode

use crate::config::CrawlDefaults;
use crate::crawler::types::{CrawlConfig, CrawlMode, PageResult};
use crate::crawler::{DeepCrawler, PageFetcher, SmartCrawler};
use crate::extract::ContentExtractor;
use crate::llm::ChatModelFactory;
use crate::GleanerError;
use std::sync::Arc;

/// Routes crawl requests to the single-page or deep crawler
#[derive(Clone)]
pub struct Orchestrator {
    smart: Arc<SmartCrawler>,
    deep: DeepCrawler,
    defaults: CrawlDefaults,
}

impl Orchestrator {
    /// Builds the crawler stack around a model factory
    pub fn new(models: Arc<dyn ChatModelFactory>) -> Result<Self, GleanerError> {
        let fetcher = Arc::new(PageFetcher::new()?);
        let extractor = Arc::new(ContentExtractor::new(models));
        let smart = Arc::new(SmartCrawler::new(fetcher, extractor));
        let deep = DeepCrawler::new(smart.clone());

        Ok(Self {
            smart,
            deep,
            defaults: CrawlDefaults::default(),
        })
    }

    /// Seeds the configs built by the convenience entry points
    pub fn with_defaults(mut self, defaults: CrawlDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Runs one crawl request
    ///
    /// Smart mode yields exactly one result. Search and custom modes are not
    /// implemented and yield none.
    pub async fn crawl(&self, config: &CrawlConfig) -> Vec<PageResult> {
        tracing::info!("Starting {} crawl of {}", config.mode, config.url);

        match config.mode {
            CrawlMode::Smart => vec![self.smart.crawl(config).await],
            CrawlMode::Deep => self.deep.crawl(config).await,
            CrawlMode::Search | CrawlMode::Custom => {
                tracing::warn!("Crawl mode {} is not implemented", config.mode);
                Vec::new()
            }
        }
    }

    /// Extracts from one page
    pub async fn crawl_single_page(&self, url: &str, prompt: &str) -> PageResult {
        let config = CrawlConfig::from_defaults(&self.defaults, url, prompt);
        self.smart.crawl(&config).await
    }

    /// Crawls outward from `url`, following same-site links
    pub async fn deep_crawl(
        &self,
        url: &str,
        prompt: &str,
        max_depth: u32,
        max_pages: usize,
    ) -> Vec<PageResult> {
        let config = CrawlConfig::from_defaults(&self.defaults, url, prompt)
            .with_mode(CrawlMode::Deep)
            .with_budget(max_depth, max_pages)
            .with_follow_links(true);
        self.deep.crawl(&config).await
    }
}
