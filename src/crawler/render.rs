//! Script-rendering fetch strategy
//!
//! Pages are loaded in a headless Chromium so that client-side scripts run
//! before the markup is captured. The browser backend is only compiled with
//! the `headless` feature; without it every rendered fetch reports a failure.

use crate::crawler::types::{CrawlConfig, PageContent};

/// Fetches `config.url` in a headless browser
#[cfg(feature = "headless")]
pub async fn fetch_rendered(config: &CrawlConfig) -> PageContent {
    match tokio::time::timeout(config.timeout(), browser::render(config)).await {
        Ok(Ok(content)) => content,
        Ok(Err(e)) => PageContent::failure(&config.url, e),
        Err(_) => PageContent::failure(&config.url, "Render timeout"),
    }
}

/// Fetches `config.url` in a headless browser
#[cfg(not(feature = "headless"))]
pub async fn fetch_rendered(config: &CrawlConfig) -> PageContent {
    PageContent::failure(
        &config.url,
        "Script rendering unavailable: built without the `headless` feature",
    )
}

#[cfg(feature = "headless")]
mod browser {
    use crate::crawler::parser::extract_links;
    use crate::crawler::types::{CrawlConfig, PageContent};
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
    use chromiumoxide::Page;
    use futures::StreamExt;
    use std::time::Duration;
    use url::Url;

    /// Interval between quiescence probes
    const SETTLE_POLL: Duration = Duration::from_millis(500);

    /// Upper bound on waiting for scripts to settle
    const SETTLE_LIMIT: Duration = Duration::from_secs(10);

    pub(super) async fn render(config: &CrawlConfig) -> Result<PageContent, String> {
        tracing::debug!("Launching headless browser for {}", config.url);

        let browser_config = BrowserConfig::builder()
            .arg(format!("--user-agent={}", config.user_agent))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--blink-settings=imagesEnabled=false")
            .build()
            .map_err(|e| format!("Browser config error: {}", e))?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| format!("Failed to launch browser: {}", e))?;
        let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let result = load(&browser, config).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        handle.abort();

        result
    }

    async fn load(browser: &Browser, config: &CrawlConfig) -> Result<PageContent, String> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| format!("Failed to create page: {}", e))?;

        if !config.headers.is_empty() {
            let headers = serde_json::to_value(&config.headers).map_err(|e| e.to_string())?;
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
                .await
                .map_err(|e| format!("Failed to set headers: {}", e))?;
        }

        page.goto(config.url.as_str())
            .await
            .map_err(|e| format!("Failed to navigate: {}", e))?;

        let status_code = page
            .wait_for_navigation_response()
            .await
            .ok()
            .flatten()
            .and_then(|request| request.response.as_ref().map(|r| r.status as u16));

        wait_until_settled(&page).await;

        let html = page
            .content()
            .await
            .map_err(|e| format!("Failed to get page content: {}", e))?;
        let title = page
            .get_title()
            .await
            .ok()
            .flatten()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let text = evaluate_string(&page, "document.body ? document.body.innerText : ''")
            .await
            .unwrap_or_default()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let links = match Url::parse(&config.url) {
            Ok(base_url) => extract_links(&html, &base_url),
            Err(_) => Vec::new(),
        };

        Ok(PageContent {
            url: config.url.clone(),
            html,
            text,
            title,
            status_code,
            content_type: Some("text/html".to_string()),
            headers: Default::default(),
            links,
            success: true,
            error_message: None,
        })
    }

    /// Waits until the document is complete and its markup stops changing
    async fn wait_until_settled(page: &Page) {
        let started = tokio::time::Instant::now();
        let mut last_len = None;

        while started.elapsed() < SETTLE_LIMIT {
            tokio::time::sleep(SETTLE_POLL).await;

            let ready = evaluate_string(page, "document.readyState").await;
            let len = page.content().await.map(|html| html.len()).ok();

            if ready.as_deref() == Some("complete") && len.is_some() && len == last_len {
                return;
            }
            last_len = len;
        }
        tracing::debug!("Page did not settle within {:?}", SETTLE_LIMIT);
    }

    async fn evaluate_string(page: &Page, expression: &str) -> Option<String> {
        page.evaluate(expression)
            .await
            .ok()
            .and_then(|result| result.into_value::<String>().ok())
    }
}
