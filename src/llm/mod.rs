//! Chat model clients
//!
//! Every provider is reduced to a single operation, `chat(prompt) -> reply`.
//! Clients are built by a [`ChatModelFactory`] from the provider's settings
//! record; the factory is constructed once and shared between crawls.

mod anthropic;
mod azure;
mod gemini;
mod http;
mod ollama;
mod openai;
mod provider;

pub use anthropic::AnthropicClient;
pub use azure::AzureOpenAiClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use provider::LlmProvider;

use crate::config::{LlmConfig, ProviderSettings};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by model clients
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured for {provider} (set api-key or {env})")]
    MissingApiKey {
        provider: LlmProvider,
        env: &'static str,
    },

    #[error("{provider} is misconfigured: {message}")]
    Misconfigured {
        provider: LlmProvider,
        message: String,
    },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: LlmProvider,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unreadable reply: {message}")]
    Decode {
        provider: LlmProvider,
        message: String,
    },

    #[error("{0} returned an empty reply")]
    EmptyReply(LlmProvider),
}

impl LlmError {
    /// Returns true if retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A chat-capable model client
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends one prompt and returns the model's text reply
    async fn chat(&self, prompt: &str) -> Result<String, LlmError>;

    /// The provider serving this client
    fn provider(&self) -> LlmProvider;
}

/// Builds chat clients for a provider
pub trait ChatModelFactory: Send + Sync {
    fn create(&self, provider: LlmProvider) -> Result<Box<dyn ChatModel>, LlmError>;

    /// Provider used when a request does not name one
    fn default_provider(&self) -> LlmProvider;

    fn create_default(&self) -> Result<Box<dyn ChatModel>, LlmError> {
        self.create(self.default_provider())
    }
}

/// Factory building HTTP clients for the configured providers
pub struct LlmClientFactory {
    config: LlmConfig,
    http: Client,
}

impl LlmClientFactory {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

impl ChatModelFactory for LlmClientFactory {
    fn create(&self, provider: LlmProvider) -> Result<Box<dyn ChatModel>, LlmError> {
        let params = ClientParams::resolve(provider, self.config.settings(provider))?;
        let http = self.http.clone();

        Ok(match provider {
            LlmProvider::OpenAi => Box::new(OpenAiClient::new(http, params)),
            LlmProvider::Ollama => Box::new(OllamaClient::new(http, params)),
            LlmProvider::AzureOpenAi => Box::new(AzureOpenAiClient::new(
                http,
                params,
                &self.config.azure_openai,
            )?),
            LlmProvider::Anthropic => Box::new(AnthropicClient::new(http, params)),
            LlmProvider::Gemini => Box::new(GeminiClient::new(http, params)),
        })
    }

    fn default_provider(&self) -> LlmProvider {
        self.config.default_provider
    }
}

/// Provider settings with defaults and environment fallbacks applied
#[derive(Debug, Clone)]
pub struct ClientParams {
    /// Endpoint root without a trailing slash
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl ClientParams {
    /// Resolves raw settings for `provider`
    ///
    /// The base URL is overridden only when one is configured. An empty API
    /// key falls back to the provider's environment variable; only Ollama may
    /// run without a key.
    pub fn resolve(provider: LlmProvider, settings: &ProviderSettings) -> Result<Self, LlmError> {
        let base_url = settings
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .or(provider.default_base_url())
            .ok_or_else(|| LlmError::Misconfigured {
                provider,
                message: "base-url is required".to_string(),
            })?
            .trim_end_matches('/')
            .to_string();

        let api_key = match settings.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => match provider.api_key_env() {
                Some(env) => std::env::var(env)
                    .ok()
                    .filter(|k| !k.is_empty())
                    .ok_or(LlmError::MissingApiKey { provider, env })?,
                None => String::new(),
            },
        };

        let model = if settings.model_name.is_empty() {
            provider.default_model().to_string()
        } else {
            settings.model_name.clone()
        };

        Ok(Self {
            base_url,
            api_key,
            model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout),
            max_retries: settings.max_retries,
        })
    }
}
