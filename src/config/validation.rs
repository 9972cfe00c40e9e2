use crate::config::types::{Config, CrawlDefaults, LlmConfig, ProviderSettings};
use crate::llm::LlmProvider;
use crate::ConfigError;
use crate::url::LinkFilter;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_defaults(&config.crawl)?;
    validate_llm_config(&config.llm)?;
    Ok(())
}

/// Validates crawl defaults
fn validate_crawl_defaults(config: &CrawlDefaults) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be greater than zero".to_string(),
        ));
    }

    if !config.rate_limit.is_finite() {
        return Err(ConfigError::Validation(format!(
            "rate_limit must be a finite number, got {}",
            config.rate_limit
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(pattern) = &config.link_pattern {
        validate_link_pattern(pattern)?;
    }

    if let Some(selector) = &config.css_selector {
        if scraper::Selector::parse(selector).is_err() {
            return Err(ConfigError::Validation(format!(
                "css_selector '{}' is not a valid CSS selector",
                selector
            )));
        }
    }

    Ok(())
}

/// Checks that a link pattern compiles in its whole-link form
pub(crate) fn validate_link_pattern(pattern: &str) -> Result<(), ConfigError> {
    LinkFilter::compile_pattern(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

/// Validates every provider's settings, plus the extra requirements of the default provider
fn validate_llm_config(config: &LlmConfig) -> Result<(), ConfigError> {
    for provider in LlmProvider::ALL {
        validate_provider_settings(provider, config.settings(provider))?;
    }

    if config.default_provider == LlmProvider::AzureOpenAi {
        if config.azure_openai.common.base_url.is_none() {
            return Err(ConfigError::Validation(
                "azure-openai requires base-url".to_string(),
            ));
        }
        if config.azure_openai.deployment_name.is_empty() {
            return Err(ConfigError::Validation(
                "azure-openai requires deployment-name".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_provider_settings(
    provider: LlmProvider,
    settings: &ProviderSettings,
) -> Result<(), ConfigError> {
    if let Some(base_url) = &settings.base_url {
        Url::parse(base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base_url for {}: {}", provider, e))
        })?;
    }

    if !(0.0..=2.0).contains(&settings.temperature) {
        return Err(ConfigError::Validation(format!(
            "{} temperature must be between 0 and 2, got {}",
            provider, settings.temperature
        )));
    }

    if settings.max_tokens == 0 {
        return Err(ConfigError::Validation(format!(
            "{} max_tokens must be >= 1",
            provider
        )));
    }

    if settings.timeout == 0 {
        return Err(ConfigError::Validation(format!(
            "{} timeout must be >= 1 second",
            provider
        )));
    }

    Ok(())
}
