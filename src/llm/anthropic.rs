use crate::llm::http::send_with_retries;
use crate::llm::{ChatModel, ClientParams, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenates every text block of the reply
    fn into_text(self) -> String {
        self.content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect()
    }
}

/// Client for the Anthropic Messages API
pub struct AnthropicClient {
    http: Client,
    params: ClientParams,
}

impl AnthropicClient {
    pub fn new(http: Client, params: ClientParams) -> Self {
        Self { http, params }
    }
}

#[async_trait]
impl ChatModel for AnthropicClient {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.params.base_url);
        let body = MessagesRequest {
            model: &self.params.model,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response: MessagesResponse =
            send_with_retries(self.provider(), self.params.max_retries, || {
                self.http
                    .post(&url)
                    .header("x-api-key", &self.params.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .timeout(self.params.timeout)
                    .json(&body)
            })
            .await?;

        let text = response.into_text();
        if text.is_empty() {
            return Err(LlmError::EmptyReply(self.provider()));
        }
        Ok(text)
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Anthropic
    }
}
