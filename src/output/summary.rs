//! Merged view over the results of one crawl

use crate::crawler::{PageResult, StructuredData};
use serde::Serialize;

const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Per-page line of a crawl summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageOutline {
    pub url: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error_message: Option<String>,
}

/// Summary of a crawl, merged from its page results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    pub success: bool,

    /// Contents of successful pages, each headed by its position and URL
    pub content: String,

    /// Structured data of the first page
    pub structured_data: StructuredData,

    /// Links of the first page
    pub links: Vec<String>,

    pub total_pages: usize,
    pub successful_pages: usize,

    /// Sum of per-page durations (milliseconds)
    pub duration_ms: u64,

    pub error_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    pub pages: Vec<PageOutline>,
}

impl CrawlSummary {
    /// Merges page results in visit order
    ///
    /// An empty result list produces an unsuccessful summary.
    pub fn from_results(results: &[PageResult]) -> Self {
        let Some(first) = results.first() else {
            return Self {
                success: false,
                error_message: Some("No results".to_string()),
                ..Self::default()
            };
        };

        let content = results
            .iter()
            .enumerate()
            .filter(|(_, result)| result.success)
            .map(|(i, result)| format!("Page {}: {}\n{}", i + 1, result.url, result.content))
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);

        Self {
            success: true,
            content,
            structured_data: first.structured_data.clone(),
            links: first.links.clone(),
            total_pages: results.len(),
            successful_pages: results.iter().filter(|r| r.success).count(),
            duration_ms: results.iter().map(|r| r.duration_ms).sum(),
            error_message: None,
            config_hash: None,
            pages: results
                .iter()
                .map(|r| PageOutline {
                    url: r.url.clone(),
                    success: r.success,
                    duration_ms: r.duration_ms,
                    error_message: r.error_message.clone(),
                })
                .collect(),
        }
    }

    /// Tags the summary with the hash of the configuration that produced it
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Percentage of pages that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.successful_pages as f64 / self.total_pages as f64) * 100.0
    }
}
