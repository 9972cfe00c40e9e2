//! Bounded breadth-first crawl over same-site links

use crate::crawler::types::{CrawlConfig, PageResult};
use crate::crawler::PageCrawler;
use crate::url::LinkFilter;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Crawls outward from a start page, level by level
///
/// Depth and page budgets come from the crawl config. Each page is handed to
/// the wrapped [`PageCrawler`]; its result is kept whether or not it succeeded.
#[derive(Clone)]
pub struct DeepCrawler {
    pages: Arc<dyn PageCrawler>,
}

impl DeepCrawler {
    pub fn new(pages: Arc<dyn PageCrawler>) -> Self {
        Self { pages }
    }

    /// Runs the crawl and returns results in visit order
    ///
    /// # Arguments
    ///
    /// * `config` - Start URL, budgets, link policy and per-page settings
    ///
    /// # Returns
    ///
    /// At most `config.max_pages` results, one per visited URL, none deeper
    /// than `config.max_depth`.
    pub async fn crawl(&self, config: &CrawlConfig) -> Vec<PageResult> {
        tracing::info!(
            "Starting deep crawl from {} (max depth {}, max pages {})",
            config.url,
            config.max_depth,
            config.max_pages
        );

        let filter = self.link_filter(config);
        let delay = config.rate_limit_delay();

        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut results: Vec<PageResult> = Vec::new();

        queue.push_back((config.url.clone(), 0));

        while results.len() < config.max_pages {
            let Some((url, depth)) = queue.pop_front() else {
                break;
            };

            if visited.contains(&url) || depth > config.max_depth {
                continue;
            }
            visited.insert(url.clone());

            tracing::info!(
                "Crawling page {}/{} at depth {}: {}",
                results.len() + 1,
                config.max_pages,
                depth,
                url
            );

            let result = self.pages.crawl_page(&config.for_page(&url)).await;
            if !result.success {
                tracing::warn!(
                    "Page {} failed: {}",
                    url,
                    result.error_message.as_deref().unwrap_or("unknown error")
                );
            }

            if config.follow_links && result.success && depth < config.max_depth {
                if let Some(filter) = &filter {
                    let mut queued = 0;
                    for link in filter.filter(&result.links, &result.url) {
                        if results.len() >= config.max_pages {
                            break;
                        }
                        if !visited.contains(&link) {
                            queue.push_back((link, depth + 1));
                            queued += 1;
                        }
                    }
                    tracing::debug!("Queued {} links from {}", queued, url);
                }
            }

            results.push(result);

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        tracing::info!(
            "Deep crawl from {} finished: {} pages, {} succeeded",
            config.url,
            results.len(),
            succeeded
        );

        results
    }

    /// Compiles the link pattern; None disables link following
    fn link_filter(&self, config: &CrawlConfig) -> Option<LinkFilter> {
        match LinkFilter::new(config.link_pattern.as_deref()) {
            Ok(filter) => Some(filter),
            Err(e) => {
                tracing::error!(
                    "Invalid link pattern {:?}, links will not be followed: {}",
                    config.link_pattern,
                    e
                );
                None
            }
        }
    }
}
