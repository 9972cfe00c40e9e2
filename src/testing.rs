//! Scripted chat models for unit tests

use crate::llm::{ChatModel, ChatModelFactory, LlmError, LlmProvider};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Marker present only in structured-extraction prompts
const JSON_MARKER: &str = "Return ONLY valid JSON";

#[derive(Default)]
struct Log {
    prompts: Vec<String>,
    providers: Vec<LlmProvider>,
}

/// Factory whose models answer with fixed replies and record every call
pub struct ScriptedFactory {
    text_reply: String,
    json_reply: String,
    fail: bool,
    log: Arc<Mutex<Log>>,
}

impl ScriptedFactory {
    pub fn new(text_reply: &str) -> Self {
        Self {
            text_reply: text_reply.to_string(),
            json_reply: "{}".to_string(),
            fail: false,
            log: Arc::default(),
        }
    }

    /// Models that fail every call with a server error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    /// Reply used for structured-extraction prompts
    pub fn with_json_reply(mut self, reply: &str) -> Self {
        self.json_reply = reply.to_string();
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.log.lock().unwrap().prompts.clone()
    }

    pub fn providers(&self) -> Vec<LlmProvider> {
        self.log.lock().unwrap().providers.clone()
    }
}

impl ChatModelFactory for ScriptedFactory {
    fn create(&self, provider: LlmProvider) -> Result<Box<dyn ChatModel>, LlmError> {
        Ok(Box::new(ScriptedModel {
            provider,
            text_reply: self.text_reply.clone(),
            json_reply: self.json_reply.clone(),
            fail: self.fail,
            log: self.log.clone(),
        }))
    }

    fn default_provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }
}

struct ScriptedModel {
    provider: LlmProvider,
    text_reply: String,
    json_reply: String,
    fail: bool,
    log: Arc<Mutex<Log>>,
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        {
            let mut log = self.log.lock().unwrap();
            log.prompts.push(prompt.to_string());
            log.providers.push(self.provider);
        }

        if self.fail {
            return Err(LlmError::Status {
                provider: self.provider,
                status: 500,
                body: "scripted failure".to_string(),
            });
        }

        if prompt.contains(JSON_MARKER) {
            Ok(self.json_reply.clone())
        } else {
            Ok(self.text_reply.clone())
        }
    }

    fn provider(&self) -> LlmProvider {
        self.provider
    }
}
