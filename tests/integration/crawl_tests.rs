//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site (and, for the full-stack
//! test, an OpenAI-compatible model endpoint) and run crawls end-to-end.

use async_trait::async_trait;
use gleaner::config::{parse_config, CrawlDefaults};
use gleaner::{
    ChatModel, ChatModelFactory, CrawlConfig, CrawlMode, CrawlSummary, LlmClientFactory,
    LlmError, LlmProvider, Orchestrator,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Model that answers free-text prompts with `text` and JSON prompts with `json`
struct CannedModel {
    text: String,
    json: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ChatModel for CannedModel {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains("Return ONLY valid JSON") {
            Ok(self.json.clone())
        } else {
            Ok(self.text.clone())
        }
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Ollama
    }
}

struct CannedFactory {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CannedFactory {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            prompts: Arc::default(),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ChatModelFactory for CannedFactory {
    fn create(&self, _provider: LlmProvider) -> Result<Box<dyn ChatModel>, LlmError> {
        Ok(Box::new(CannedModel {
            text: "Extracted summary".to_string(),
            json: "```json\n{\"topic\": \"widgets\"}\n```".to_string(),
            prompts: self.prompts.clone(),
        }))
    }

    fn default_provider(&self) -> LlmProvider {
        LlmProvider::Ollama
    }
}

fn fast_defaults() -> CrawlDefaults {
    CrawlDefaults {
        rate_limit: 0.0,
        timeout_ms: 5_000,
        ..CrawlDefaults::default()
    }
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Index links to a same-site page, an external page and a PDF;
/// page1 links one level deeper to page2.
async fn start_site() -> MockServer {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <p>Welcome to the widget shop.</p>
            <a href="{base}/page1">Page 1</a>
            <a href="https://other.com/c">Elsewhere</a>
            <a href="/report.pdf">Report</a>
            <a href="/page1#reviews">Reviews</a>
            </body></html>"#
        ),
    )
    .await;
    mount_page(
        &server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body>
            <a href="/page2">Deeper</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/page2",
        "<html><head><title>Page 2</title></head><body>End</body></html>".to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_single_page_crawl() {
    let server = start_site().await;
    let factory = CannedFactory::new();
    let orchestrator = Orchestrator::new(factory.clone())
        .unwrap()
        .with_defaults(fast_defaults());

    let result = orchestrator
        .crawl_single_page(&format!("{}/", server.uri()), "What is sold here?")
        .await;

    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.content, "Extracted summary");
    assert_eq!(result.structured_data["topic"], "widgets");
    assert_eq!(result.metadata["title"], "Home");
    assert_eq!(result.metadata["statusCode"], "200");
    assert_eq!(result.links.len(), 4);

    let prompts = factory.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Welcome to the widget shop."));
    assert!(prompts[0].contains("Task: What is sold here?"));
}

#[tokio::test]
async fn test_deep_crawl_stays_on_site() {
    let server = start_site().await;
    let orchestrator = Orchestrator::new(CannedFactory::new())
        .unwrap()
        .with_defaults(fast_defaults());

    let results = orchestrator
        .deep_crawl(&format!("{}/", server.uri()), "Summarize", 1, 10)
        .await;

    let urls: Vec<_> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![format!("{}/", server.uri()), format!("{}/page1", server.uri())]
    );
    assert!(results.iter().all(|r| r.success));
}

#[tokio::test]
async fn test_deep_crawl_respects_depth_and_page_budget() {
    let server = start_site().await;
    let orchestrator = Orchestrator::new(CannedFactory::new())
        .unwrap()
        .with_defaults(fast_defaults());
    let start = format!("{}/", server.uri());

    let deeper = orchestrator.deep_crawl(&start, "Summarize", 2, 10).await;
    assert_eq!(deeper.len(), 3);
    assert_eq!(deeper[2].url, format!("{}/page2", server.uri()));

    let capped = orchestrator.deep_crawl(&start, "Summarize", 2, 2).await;
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn test_failed_page_is_reported_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        format!(r#"<html><body><a href="{base}/broken">B</a><a href="{base}/ok">O</a></body></html>"#),
    )
    .await;
    mount_page(&server, "/ok", "<html><body>fine</body></html>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(CannedFactory::new())
        .unwrap()
        .with_defaults(fast_defaults());
    let results = orchestrator
        .deep_crawl(&format!("{base}/"), "Summarize", 1, 10)
        .await;

    assert_eq!(results.len(), 3);
    assert!(!results[1].success);
    assert_eq!(results[1].error_message.as_deref(), Some("HTTP 500"));
    assert!(results[1].content.is_empty());
    assert!(results[2].success);

    let summary = CrawlSummary::from_results(&results);
    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.successful_pages, 2);
    assert!(summary.content.starts_with(&format!("Page 1: {base}/\n")));
    assert!(summary.content.contains(&format!("Page 3: {base}/ok\n")));
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "GleanerTest/1.0"))
        .and(header("accept-language", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>ok</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = parse_config(
        r#"
[crawl]
user-agent = "GleanerTest/1.0"
rate-limit = 0.0
headers = { "Accept-Language" = "de" }
"#,
    )
    .unwrap();

    let orchestrator = Orchestrator::new(CannedFactory::new())
        .unwrap()
        .with_defaults(config.crawl.clone());
    let crawl = CrawlConfig::from_defaults(&config.crawl, format!("{}/", server.uri()), "p");
    let results = orchestrator.crawl(&crawl).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].success, "{:?}", results[0].error_message);
}

#[tokio::test]
async fn test_search_mode_returns_nothing() {
    let orchestrator = Orchestrator::new(CannedFactory::new()).unwrap();
    let config =
        CrawlConfig::new("https://example.com", "p").with_mode(CrawlMode::Search);
    assert!(orchestrator.crawl(&config).await.is_empty());
}

#[tokio::test]
async fn test_full_stack_with_openai_compatible_model() {
    let site = start_site().await;
    let model = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Return ONLY valid JSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"shop\": \"widgets\"}"}}]
        })))
        .mount(&model)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "A widget shop."}}]
        })))
        .mount(&model)
        .await;

    let config = parse_config(&format!(
        r#"
[llm]
default-provider = "openai"

[llm.openai]
base-url = "{}/v1"
api-key = "test-key"
model-name = "gpt-test"
max-retries = 0
"#,
        model.uri()
    ))
    .unwrap();

    let factory = LlmClientFactory::new(config.llm).unwrap();
    let orchestrator = Orchestrator::new(Arc::new(factory))
        .unwrap()
        .with_defaults(fast_defaults());

    let result = orchestrator
        .crawl_single_page(&format!("{}/", site.uri()), "What is this site?")
        .await;

    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.content, "A widget shop.");
    assert_eq!(result.structured_data["shop"], "widgets");
}

#[tokio::test]
async fn test_model_failure_marks_page_failed() {
    let site = start_site().await;
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&model)
        .await;

    let config = parse_config(&format!(
        r#"
[llm.openai]
base-url = "{}"
api-key = "wrong"
"#,
        model.uri()
    ))
    .unwrap();
    let orchestrator = Orchestrator::new(Arc::new(LlmClientFactory::new(config.llm).unwrap()))
        .unwrap()
        .with_defaults(fast_defaults());

    let result = orchestrator
        .crawl_single_page(&format!("{}/", site.uri()), "p")
        .await;

    assert!(!result.success);
    let error = result.error_message.unwrap();
    assert!(error.contains("401"), "{}", error);
    assert!(result.links.is_empty());
}
