//! Single-page crawl: fetch, extract, collect links

use crate::crawler::parser::select_text;
use crate::crawler::types::{CrawlConfig, PageContent, PageResult};
use crate::crawler::{PageCrawler, PageFetcher};
use crate::extract::ContentExtractor;
use crate::GleanerError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Crawls exactly one page and asks the model about it
#[derive(Clone)]
pub struct SmartCrawler {
    fetcher: Arc<PageFetcher>,
    extractor: Arc<ContentExtractor>,
}

impl SmartCrawler {
    pub fn new(fetcher: Arc<PageFetcher>, extractor: Arc<ContentExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Runs the page pipeline
    ///
    /// A fetch failure ends the pipeline early. Any later error becomes a
    /// failure result; nothing is raised to the caller.
    pub async fn crawl(&self, config: &CrawlConfig) -> PageResult {
        let started = Instant::now();
        tracing::info!("Smart crawl of {}", config.url);

        let page = self.fetcher.fetch(config).await;
        if !page.success {
            let error = page
                .error_message
                .unwrap_or_else(|| "Fetch failed".to_string());
            return PageResult::failure(&config.url, error, elapsed_ms(started));
        }

        match self.process(config, page, started).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Smart crawl of {} failed: {}", config.url, e);
                PageResult::failure(&config.url, e.to_string(), elapsed_ms(started))
            }
        }
    }

    async fn process(
        &self,
        config: &CrawlConfig,
        mut page: PageContent,
        started: Instant,
    ) -> Result<PageResult, GleanerError> {
        if let Some(css_selector) = &config.css_selector {
            let narrowed = select_text(&page.html, css_selector);
            if !narrowed.is_empty() {
                page.text = narrowed;
            }
        }

        let content = self
            .extractor
            .extract_text(&page, &config.prompt, config.provider)
            .await?;
        let structured_data = self
            .extractor
            .extract_structured(&page, &config.prompt, config.provider)
            .await;

        let mut metadata = BTreeMap::new();
        metadata.insert("title".to_string(), page.title.clone().unwrap_or_default());
        metadata.insert(
            "statusCode".to_string(),
            page.status_code
                .map(|code| code.to_string())
                .unwrap_or_default(),
        );

        Ok(PageResult {
            url: page.url,
            content,
            raw_html: page.html,
            structured_data,
            metadata,
            links: page.links,
            extracted_at: Utc::now(),
            duration_ms: elapsed_ms(started),
            success: true,
            error_message: None,
        })
    }
}

#[async_trait]
impl PageCrawler for SmartCrawler {
    async fn crawl_page(&self, config: &CrawlConfig) -> PageResult {
        self.crawl(config).await
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
