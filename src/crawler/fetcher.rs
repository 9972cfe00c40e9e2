//! HTTP fetcher implementation
//!
//! This module retrieves pages for the crawler:
//! - Building a shared HTTP client
//! - Dispatching on the configured [`FetchStrategy`]
//! - Static GET requests with per-request user agent, headers and timeout
//! - Converting every failure into a `PageContent` failure marker

use crate::crawler::parser::parse_html;
use crate::crawler::render::fetch_rendered;
use crate::crawler::types::{CrawlConfig, FetchStrategy, PageContent};
use reqwest::header::{HeaderMap, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Largest response body accepted by the static fetcher
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the HTTP client shared by all static fetches
///
/// User agent, headers and timeout are per crawl and set on each request.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves pages using the strategy chosen by each crawl config
///
/// Never returns an error: every failure is reported through
/// `PageContent::success` and `PageContent::error_message`.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `config.url` with the configured strategy
    pub async fn fetch(&self, config: &CrawlConfig) -> PageContent {
        let content = match config.strategy {
            FetchStrategy::Static => self.fetch_static(config).await,
            FetchStrategy::ScriptRendering => fetch_rendered(config).await,
        };

        if let Some(error) = &content.error_message {
            tracing::error!("Failed to fetch {}: {}", config.url, error);
        }
        content
    }

    /// Plain GET; scripts on the page are not executed
    pub async fn fetch_static(&self, config: &CrawlConfig) -> PageContent {
        let url = match Url::parse(&config.url) {
            Ok(url) => url,
            Err(e) => return PageContent::failure(&config.url, format!("Invalid URL: {}", e)),
        };

        let mut request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &config.user_agent)
            .timeout(config.timeout());
        for (name, value) in &config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return PageContent::failure(&config.url, describe_error(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            return PageContent::failure(&config.url, format!("HTTP {}", status.as_u16()));
        }

        let headers = header_map(response.headers());
        let content_type = headers.get(CONTENT_TYPE.as_str()).cloned();

        if response
            .content_length()
            .map_or(false, |len| len as usize > MAX_BODY_BYTES)
        {
            return PageContent::failure(&config.url, "Response body too large");
        }

        let html = match response.text().await {
            Ok(body) => body,
            Err(e) => return PageContent::failure(&config.url, describe_error(&e)),
        };
        if html.len() > MAX_BODY_BYTES {
            return PageContent::failure(&config.url, "Response body too large");
        }

        let parsed = parse_html(&html, &url);

        PageContent {
            url: config.url.clone(),
            text: parsed.text,
            title: parsed.title,
            links: parsed.links,
            html,
            status_code: Some(status.as_u16()),
            content_type,
            headers,
            success: true,
            error_message: None,
        }
    }
}

/// Flattens response headers; repeated headers are joined with ", "
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    map
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
