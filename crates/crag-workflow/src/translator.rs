use std::sync::Arc;

use async_trait::async_trait;
use crag_core::{ChatModel, ChatRequest, CragError, Message};

use crate::prompts;

/// Renders text into another language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, CragError>;
}

/// [`Translator`] backed by a chat model. Targets Korean unless configured
/// otherwise.
pub struct LlmTranslator {
    model: Arc<dyn ChatModel>,
    language: String,
}

impl LlmTranslator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            language: "Korean".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str) -> Result<String, CragError> {
        tracing::debug!(language = %self.language, chars = text.len(), "translating answer");
        let request = ChatRequest::new(vec![
            Message::system(prompts::translator_system(&self.language)),
            Message::human(text),
        ]);
        Ok(self.model.chat(request).await?.message.content)
    }
}
