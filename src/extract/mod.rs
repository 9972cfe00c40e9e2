//! Model-backed content extraction
//!
//! This module turns fetched pages into extraction results:
//! - Free-text extraction, which reports model failures to the caller
//! - Structured (JSON) extraction, which degrades to an empty mapping
//! - Summaries and named-entity extraction built on the two primitives

mod json;
mod prompts;

pub use json::parse_json_reply;
pub use prompts::{truncate_content, MAX_CONTENT_CHARS};

use crate::crawler::{PageContent, StructuredData};
use crate::llm::{ChatModelFactory, LlmError, LlmProvider};
use prompts::{
    build_prompt, entities_task, summary_task, STRUCTURED_SYSTEM_PROMPT, TEXT_SYSTEM_PROMPT,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by free-text extraction
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Content extraction failed for {url}: {source}")]
    Extraction {
        url: String,
        #[source]
        source: LlmError,
    },
}

/// Extracts information from pages with a chat model
#[derive(Clone)]
pub struct ContentExtractor {
    models: Arc<dyn ChatModelFactory>,
}

impl ContentExtractor {
    pub fn new(models: Arc<dyn ChatModelFactory>) -> Self {
        Self { models }
    }

    /// Asks the model to perform `prompt` on the page and returns its reply
    ///
    /// # Arguments
    ///
    /// * `page` - Fetched page; its text is truncated before prompting
    /// * `prompt` - The extraction task
    /// * `provider` - Model provider, or None for the factory default
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The raw model reply
    /// * `Err(ExtractionError)` - The client could not be built or the call failed
    pub async fn extract_text(
        &self,
        page: &PageContent,
        prompt: &str,
        provider: Option<LlmProvider>,
    ) -> Result<String, ExtractionError> {
        let full_prompt = build_prompt(TEXT_SYSTEM_PROMPT, page, prompt);

        self.ask(&full_prompt, provider)
            .await
            .map_err(|source| {
                tracing::error!("Failed to extract content from {}: {}", page.url, source);
                ExtractionError::Extraction {
                    url: page.url.clone(),
                    source,
                }
            })
    }

    /// Asks the model for a JSON object describing the page
    ///
    /// Never fails: model errors and unparsable replies yield an empty mapping.
    pub async fn extract_structured(
        &self,
        page: &PageContent,
        prompt: &str,
        provider: Option<LlmProvider>,
    ) -> StructuredData {
        let full_prompt = build_prompt(STRUCTURED_SYSTEM_PROMPT, page, prompt);

        match self.ask(&full_prompt, provider).await {
            Ok(reply) => parse_json_reply(&reply),
            Err(e) => {
                tracing::warn!("Failed to extract structured data from {}: {}", page.url, e);
                StructuredData::new()
            }
        }
    }

    /// Summarizes the page in roughly `max_length / 5` words
    pub async fn summarize(
        &self,
        page: &PageContent,
        max_length: usize,
    ) -> Result<String, ExtractionError> {
        self.extract_text(page, &summary_task(max_length), None)
            .await
    }

    /// Extracts the named kinds of entities (e.g. "names", "prices") as JSON
    pub async fn extract_entities(&self, page: &PageContent, entities: &[&str]) -> StructuredData {
        self.extract_structured(page, &entities_task(entities), None)
            .await
    }

    async fn ask(&self, prompt: &str, provider: Option<LlmProvider>) -> Result<String, LlmError> {
        let model = match provider {
            Some(provider) => self.models.create(provider)?,
            None => self.models.create_default()?,
        };

        tracing::info!("Extracting content using {}", model.provider());
        model.chat(prompt).await
    }
}
