use crate::llm::LlmProvider;
use serde::Deserialize;
use std::collections::BTreeMap;

/// User agent sent when the config does not override it
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Main configuration structure for Gleaner
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlDefaults,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Defaults applied to every crawl configuration built from this file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlDefaults {
    /// Maximum link depth followed from the start page
    pub max_depth: u32,

    /// Maximum number of pages returned by one crawl
    pub max_pages: usize,

    /// Per-fetch timeout (milliseconds)
    pub timeout_ms: u64,

    /// Requests per second; zero or negative disables throttling
    pub rate_limit: f64,

    pub user_agent: String,

    /// Whether deep crawls follow discovered links
    pub follow_links: bool,

    /// Regular expression a link must fully match to be followed
    pub link_pattern: Option<String>,

    /// Render pages in a headless browser instead of a plain GET
    pub script_rendering: bool,

    /// Extra request headers
    pub headers: BTreeMap<String, String>,

    /// Narrows the text handed to the model to the first match of this selector
    pub css_selector: Option<String>,
}

impl Default for CrawlDefaults {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 10,
            timeout_ms: 30_000,
            rate_limit: 1.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            follow_links: false,
            link_pattern: None,
            script_rendering: false,
            headers: BTreeMap::new(),
            css_selector: None,
        }
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LlmConfig {
    /// Provider used when a request does not name one
    #[serde(default)]
    pub default_provider: LlmProvider,

    #[serde(default)]
    pub openai: ProviderSettings,

    #[serde(default = "ollama_defaults")]
    pub ollama: ProviderSettings,

    #[serde(default)]
    pub azure_openai: AzureSettings,

    #[serde(default)]
    pub anthropic: ProviderSettings,

    #[serde(default)]
    pub gemini: ProviderSettings,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: LlmProvider::default(),
            openai: ProviderSettings::default(),
            ollama: ollama_defaults(),
            azure_openai: AzureSettings::default(),
            anthropic: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
        }
    }
}

impl LlmConfig {
    /// Returns the shared settings record for a provider
    pub fn settings(&self, provider: LlmProvider) -> &ProviderSettings {
        match provider {
            LlmProvider::OpenAi => &self.openai,
            LlmProvider::Ollama => &self.ollama,
            LlmProvider::AzureOpenAi => &self.azure_openai.common,
            LlmProvider::Anthropic => &self.anthropic,
            LlmProvider::Gemini => &self.gemini,
        }
    }
}

/// Connection and sampling settings for one model provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProviderSettings {
    /// Endpoint override; the provider default is used when absent
    pub base_url: Option<String>,

    /// API key; falls back to the provider's environment variable when empty
    pub api_key: Option<String>,

    /// Model name; the provider default is used when empty
    pub model_name: String,

    pub temperature: f64,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Request timeout (seconds)
    pub timeout: u64,

    pub max_retries: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model_name: String::new(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout: 60,
            max_retries: 10,
        }
    }
}

/// Azure OpenAI settings: the shared record plus deployment addressing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AzureSettings {
    #[serde(flatten)]
    pub common: ProviderSettings,

    #[serde(default)]
    pub deployment_name: String,

    #[serde(default = "default_azure_api_version")]
    pub api_version: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            common: ProviderSettings::default(),
            deployment_name: String::new(),
            api_version: default_azure_api_version(),
        }
    }
}

fn default_azure_api_version() -> String {
    "2024-06-01".to_string()
}

fn ollama_defaults() -> ProviderSettings {
    ProviderSettings {
        base_url: Some("http://localhost:11434".to_string()),
        ..ProviderSettings::default()
    }
}
