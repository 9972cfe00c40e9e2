use crate::llm::http::send_with_retries;
use crate::llm::{ChatModel, ClientParams, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaReply>,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    #[serde(default)]
    content: String,
}

/// Client for a locally hosted Ollama server
pub struct OllamaClient {
    http: Client,
    params: ClientParams,
}

impl OllamaClient {
    pub fn new(http: Client, params: ClientParams) -> Self {
        Self { http, params }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.params.base_url);
        let body = OllamaChatRequest {
            model: &self.params.model,
            messages: vec![OllamaMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: OllamaOptions {
                temperature: self.params.temperature,
                num_predict: self.params.max_tokens,
            },
        };

        let response: OllamaChatResponse =
            send_with_retries(self.provider(), self.params.max_retries, || {
                self.http
                    .post(&url)
                    .timeout(self.params.timeout)
                    .json(&body)
            })
            .await?;

        response
            .message
            .map(|m| m.content)
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyReply(self.provider()))
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Ollama
    }
}
