use crate::config::AzureSettings;
use crate::llm::http::send_with_retries;
use crate::llm::openai::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::llm::{ChatModel, ClientParams, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;

/// Client for OpenAI deployments hosted on Azure
///
/// Same wire format as OpenAI, addressed by deployment rather than model name
/// and authenticated with an `api-key` header.
pub struct AzureOpenAiClient {
    http: Client,
    params: ClientParams,
    endpoint: String,
}

impl AzureOpenAiClient {
    pub fn new(http: Client, params: ClientParams, azure: &AzureSettings) -> Result<Self, LlmError> {
        if azure.deployment_name.is_empty() {
            return Err(LlmError::Misconfigured {
                provider: LlmProvider::AzureOpenAi,
                message: "deployment-name is required".to_string(),
            });
        }

        let endpoint = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            params.base_url, azure.deployment_name, azure.api_version
        );

        Ok(Self {
            http,
            params,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: None,
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
                    .post(&self.endpoint)
                    .header("api-key", &self.params.api_key)
                    .timeout(self.params.timeout)
                    .json(&body)
            })
            .await?;

        response.into_text(self.provider())
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::AzureOpenAi
    }
}
