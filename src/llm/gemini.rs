use crate::llm::http::send_with_retries;
use crate::llm::{ChatModel, ClientParams, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

/// Client for the Google Gemini API
pub struct GeminiClient {
    http: Client,
    params: ClientParams,
}

impl GeminiClient {
    pub fn new(http: Client, params: ClientParams) -> Self {
        Self { http, params }
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.params.base_url, self.params.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.params.temperature,
                max_output_tokens: self.params.max_tokens,
            },
        };

        let response: GenerateContentResponse =
            send_with_retries(self.provider(), self.params.max_retries, || {
                self.http
                    .post(&url)
                    .header("x-goog-api-key", &self.params.api_key)
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
        LlmProvider::Gemini
    }
}
