use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so results can be tied back to the exact settings used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawl]
max-depth = 2
max-pages = 25
rate-limit = 0.5
follow-links = true
link-pattern = "https://example\\.com/docs/.*"
headers = { "Accept-Language" = "en" }

[llm]
default-provider = "anthropic"

[llm.anthropic]
api-key = "sk-test"
model-name = "claude-3-5-haiku-latest"
max-tokens = 1024
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.max_depth, 2);
        assert_eq!(config.crawl.max_pages, 25);
        assert!(config.crawl.follow_links);
        assert_eq!(
            config.crawl.headers.get("Accept-Language"),
            Some(&"en".to_string())
        );
        assert_eq!(config.llm.default_provider, LlmProvider::Anthropic);
        assert_eq!(config.llm.anthropic.max_tokens, 1024);
        // Unspecified fields keep their defaults
        assert_eq!(config.llm.anthropic.timeout, 60);
        assert_eq!(config.llm.anthropic.max_retries, 10);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawl.max_depth, 3);
        assert_eq!(config.crawl.max_pages, 10);
        assert_eq!(config.crawl.timeout_ms, 30_000);
        assert_eq!(config.crawl.rate_limit, 1.0);
        assert_eq!(config.llm.default_provider, LlmProvider::OpenAi);
        assert_eq!(
            config.llm.ollama.base_url.as_deref(),
            Some("http://localhost:11434")
        );
    }

    #[test]
    fn test_azure_settings_flatten() {
        let config = parse_config(
            r#"
[llm]
default-provider = "azure-openai"

[llm.azure-openai]
base-url = "https://my-resource.openai.azure.com"
api-key = "azure-key"
deployment-name = "gpt4o"
temperature = 0.2
"#,
        )
        .unwrap();

        assert_eq!(config.llm.azure_openai.deployment_name, "gpt4o");
        assert_eq!(config.llm.azure_openai.common.temperature, 0.2);
        assert_eq!(
            config.llm.settings(LlmProvider::AzureOpenAi).api_key.as_deref(),
            Some("azure-key")
        );
    }

    #[test]
    fn test_invalid_toml() {
        let file = create_temp_config("[crawl\nmax-depth = ");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/gleaner.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = create_temp_config("[crawl]\nmax-depth = 1\n");
        let first = compute_config_hash(file.path()).unwrap();
        let second = compute_config_hash(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }
}
