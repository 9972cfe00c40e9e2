use crate::llm::http::send_with_retries;
use crate::llm::{ChatModel, ClientParams, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Request body of the chat completions API, shared with Azure
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub(crate) fn into_text(self, provider: LlmProvider) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyReply(provider))
    }
}

/// Client for the OpenAI chat completions API
pub struct OpenAiClient {
    http: Client,
    params: ClientParams,
}

impl OpenAiClient {
    pub fn new(http: Client, params: ClientParams) -> Self {
        Self { http, params }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.params.base_url);
        let body = ChatCompletionRequest {
            model: Some(&self.params.model),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        };

        let response: ChatCompletionResponse =
            send_with_retries(self.provider(), self.params.max_retries, || {
                self.http
                    .post(&url)
                    .bearer_auth(&self.params.api_key)
                    .timeout(self.params.timeout)
                    .json(&body)
            })
            .await?;

        response.into_text(self.provider())
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }
}
