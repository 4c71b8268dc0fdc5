use std::sync::Arc;

use async_trait::async_trait;
use crag_core::{ChatModel, ChatRequest, ChatResponse, CragError, ResponseFormat};
use crag_models::{HttpBackend, ProviderBackend, ProviderRequest};
use serde_json::{json, Value};

use crate::OllamaConfig;

/// [`ChatModel`] backed by Ollama's `/api/chat` endpoint.
pub struct OllamaChatModel {
    config: OllamaConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl OllamaChatModel {
    pub fn new(config: OllamaConfig) -> Self {
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
            "stream": false,
        });
        if request.format == ResponseFormat::Json {
            body["format"] = json!("json");
        }
        if let Some(t) = request.temperature.or(self.config.temperature) {
            body["options"] = json!({ "temperature": t });
        }
        body
    }
}

fn message_content(value: &Value) -> Result<String, CragError> {
    if let Some(err) = value.get("error").and_then(|e| e.as_str()) {
        return Err(CragError::Model(format!("ollama error: {err}")));
    }
    value
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| CragError::Parsing(format!("ollama chat response without content: {value}")))
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CragError> {
        let body = self.request_body(&request);
        let response = self
            .backend
            .send(ProviderRequest::new(self.config.endpoint("chat"), body))
            .await?
            .error_for_status(CragError::Model)?;
        Ok(ChatResponse::ai(message_content(&response.body)?))
    }
}
