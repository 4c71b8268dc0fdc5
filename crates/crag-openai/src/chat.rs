use std::sync::Arc;

use async_trait::async_trait;
use crag_core::{ChatModel, ChatRequest, ChatResponse, CragError, ResponseFormat};
use crag_models::{HttpBackend, ProviderBackend, ProviderRequest};
use serde_json::{json, Value};

use crate::OpenAiConfig;

/// [`ChatModel`] over the `/chat/completions` endpoint.
pub struct OpenAiChatModel {
    config: OpenAiConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl OpenAiChatModel {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            backend: Arc::new(HttpBackend::new()),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ProviderBackend>) -> Self {
        self.backend = backend;
        self
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });
        if let Some(t) = request.temperature.or(self.config.temperature) {
            body["temperature"] = json!(t);
        }
        if request.format == ResponseFormat::Json {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CragError> {
        let body = self.request_body(&request);
        tracing::debug!(model = %self.config.model, "openai chat completion");
        let response = self
            .backend
            .send(
                ProviderRequest::new(self.config.endpoint("chat/completions"), body)
                    .with_bearer(&self.config.api_key),
            )
            .await?
            .error_for_status(CragError::Model)?;

        let content = response.body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                CragError::Parsing(format!(
                    "chat completion without message content: {}",
                    response.body
                ))
            })?;
        Ok(ChatResponse::ai(content))
    }
}
