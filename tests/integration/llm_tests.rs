//! Integration tests for the model clients
//!
//! Each provider is pointed at a wiremock server through the TOML config and
//! driven through the public factory.

use gleaner::config::parse_config;
use gleaner::{ChatModelFactory, LlmClientFactory, LlmError, LlmProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a factory from a `[llm.<section>]` table pointed at `base_url`
fn factory(section: &str, base_url: &str, extra: &str) -> LlmClientFactory {
    let toml = format!(
        r#"
[llm.{section}]
base-url = "{base_url}"
{extra}
"#
    );
    let config = parse_config(&toml).unwrap();
    LlmClientFactory::new(config.llm).unwrap()
}

fn openai_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    }))
}

#[tokio::test]
async fn test_openai_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "max_tokens": 321,
            "messages": [{"role": "user", "content": "Hello?"}]
        })))
        .respond_with(openai_reply("Hi there"))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory(
        "openai",
        &format!("{}/v1", server.uri()),
        "api-key = \"sk-test\"\nmodel-name = \"gpt-test\"\nmax-tokens = 321",
    );
    let model = factory.create(LlmProvider::OpenAi).unwrap();

    assert_eq!(model.chat("Hello?").await.unwrap(), "Hi there");
}

#[tokio::test]
async fn test_ollama_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama-test",
            "stream": false,
            "options": {"num_predict": 64}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama-test",
            "message": {"role": "assistant", "content": "Local answer"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory(
        "ollama",
        &server.uri(),
        "model-name = \"llama-test\"\nmax-tokens = 64",
    );
    let model = factory.create(LlmProvider::Ollama).unwrap();

    assert_eq!(model.chat("Hello?").await.unwrap(), "Local answer");
}

#[tokio::test]
async fn test_azure_openai_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/deployments/my-deployment/chat/completions"))
        .and(query_param("api-version", "2024-06-01"))
        .and(header("api-key", "azure-key"))
        .respond_with(openai_reply("From Azure"))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory(
        "azure-openai",
        &server.uri(),
        "api-key = \"azure-key\"\ndeployment-name = \"my-deployment\"",
    );
    let model = factory.create(LlmProvider::AzureOpenAi).unwrap();

    assert_eq!(model.chat("Hello?").await.unwrap(), "From Azure");
}

#[tokio::test]
async fn test_anthropic_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ant-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory("anthropic", &server.uri(), "api-key = \"ant-key\"");
    let model = factory.create(LlmProvider::Anthropic).unwrap();

    assert_eq!(model.chat("Hello?").await.unwrap(), "Hello world");
}

#[tokio::test]
async fn test_gemini_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "gem-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Hello?"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Gemini says hi"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory(
        "gemini",
        &server.uri(),
        "api-key = \"gem-key\"\nmodel-name = \"gemini-test\"",
    );
    let model = factory.create(LlmProvider::Gemini).unwrap();

    assert_eq!(model.chat("Hello?").await.unwrap(), "Gemini says hi");
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(openai_reply("Recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory(
        "openai",
        &server.uri(),
        "api-key = \"sk\"\nmax-retries = 2",
    );
    let model = factory.create(LlmProvider::OpenAi).unwrap();

    assert_eq!(model.chat("Hello?").await.unwrap(), "Recovered");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory(
        "openai",
        &server.uri(),
        "api-key = \"sk\"\nmax-retries = 3",
    );
    let model = factory.create(LlmProvider::OpenAi).unwrap();

    match model.chat("Hello?").await {
        Err(LlmError::Status { status, body, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad request");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let factory = factory(
        "openai",
        &server.uri(),
        "api-key = \"sk\"\nmax-retries = 1",
    );
    let model = factory.create(LlmProvider::OpenAi).unwrap();

    let err = model.chat("Hello?").await.unwrap_err();
    assert!(matches!(err, LlmError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let factory = factory("openai", &server.uri(), "api-key = \"sk\"");
    let model = factory.create(LlmProvider::OpenAi).unwrap();

    assert!(matches!(
        model.chat("Hello?").await,
        Err(LlmError::EmptyReply(LlmProvider::OpenAi))
    ));
}

#[tokio::test]
async fn test_malformed_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let factory = factory("anthropic", &server.uri(), "api-key = \"k\"");
    let model = factory.create(LlmProvider::Anthropic).unwrap();

    assert!(matches!(
        model.chat("Hello?").await,
        Err(LlmError::Decode { .. })
    ));
}

#[test]
fn test_missing_api_key() {
    std::env::remove_var("GEMINI_API_KEY");
    let config = parse_config("[llm]\ndefault-provider = \"gemini\"\n").unwrap();
    let factory = LlmClientFactory::new(config.llm).unwrap();

    match factory.create_default() {
        Err(LlmError::MissingApiKey { provider, env }) => {
            assert_eq!(provider, LlmProvider::Gemini);
            assert_eq!(env, "GEMINI_API_KEY");
        }
        Err(other) => panic!("expected missing key, got {}", other),
        Ok(_) => panic!("expected missing key"),
    }
}

#[test]
fn test_azure_needs_deployment() {
    let config = parse_config(
        r#"
[llm.azure-openai]
base-url = "https://example.openai.azure.com"
api-key = "k"
"#,
    )
    .unwrap();
    let factory = LlmClientFactory::new(config.llm).unwrap();

    assert!(matches!(
        factory.create(LlmProvider::AzureOpenAi),
        Err(LlmError::Misconfigured { .. })
    ));
}
