use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported chat model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    /// OpenAI hosted API
    #[default]
    #[serde(rename = "openai")]
    OpenAi,

    /// Locally hosted Ollama server
    #[serde(rename = "ollama")]
    Ollama,

    /// OpenAI models deployed on Azure
    #[serde(rename = "azure-openai")]
    AzureOpenAi,

    /// Anthropic Messages API
    #[serde(rename = "anthropic")]
    Anthropic,

    /// Google Gemini API
    #[serde(rename = "gemini")]
    Gemini,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 5] = [
        Self::OpenAi,
        Self::Ollama,
        Self::AzureOpenAi,
        Self::Anthropic,
        Self::Gemini,
    ];

    /// Returns the configuration key for this provider
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::AzureOpenAi => "azure-openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// Endpoint used when the settings carry no base URL
    ///
    /// Azure has no public default; every resource has its own endpoint.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Ollama => Some("http://localhost:11434"),
            Self::AzureOpenAi => None,
            Self::Anthropic => Some("https://api.anthropic.com"),
            Self::Gemini => Some("https://generativelanguage.googleapis.com"),
        }
    }

    /// Model used when the settings leave the model name empty
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi | Self::AzureOpenAi => "gpt-4o-mini",
            Self::Ollama => "llama3.1",
            Self::Anthropic => "claude-3-5-sonnet-latest",
            Self::Gemini => "gemini-1.5-flash",
        }
    }

    /// Environment variable consulted when no API key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
            Self::AzureOpenAi => Some("AZURE_OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "azure-openai" | "azure" => Ok(Self::AzureOpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!("unknown model provider: {}", other)),
        }
    }
}
