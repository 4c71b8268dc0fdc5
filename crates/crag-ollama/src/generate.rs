use std::pin::Pin;
use std::sync::Arc;

use crag_core::CragError;
use crag_models::{ndjson_values, HttpBackend, ProviderBackend, ProviderRequest};
use futures::{Stream, StreamExt};
use serde_json::{json, Value};

use crate::OllamaConfig;

/// Stream of text increments from a generation call.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, CragError>> + Send>>;

/// A raw prompt completion request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub temperature: Option<f64>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Client for Ollama's `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl OllamaClient {
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

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn request_body(&self, request: &GenerateRequest) -> Value {
        let temperature = request.temperature.or(self.config.temperature);
        let mut body = json!({
            "model": self.config.model,
            "prompt": request.prompt,
            "stream": true,
        });
        if let Some(t) = temperature {
            body["temperature"] = json!(t);
            body["options"] = json!({ "temperature": t });
        }
        body
    }

    /// Start a streaming generation.
    ///
    /// Each item is the `response` increment of one NDJSON line, in arrival
    /// order. The stream ends when the server closes the connection or sends
    /// a line with `"done": true`. A line carrying an `error` field ends the
    /// stream with a `Model` error.
    pub async fn generate_stream(&self, request: GenerateRequest) -> Result<TokenStream, CragError> {
        let body = self.request_body(&request);
        tracing::debug!(
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "ollama generate"
        );
        let bytes = self
            .backend
            .send_stream(ProviderRequest::new(self.config.endpoint("generate"), body))
            .await?;
        let mut lines = ndjson_values(bytes);

        Ok(Box::pin(async_stream::stream! {
            while let Some(line) = lines.next().await {
                let value = match line {
                    Ok(v) => v,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                if let Some(err) = value.get("error").and_then(|e| e.as_str()) {
                    yield Err(CragError::Model(format!("ollama error: {err}")));
                    return;
                }
                let piece = value
                    .get("response")
                    .and_then(|r| r.as_str())
                    .unwrap_or_default();
                if !piece.is_empty() {
                    yield Ok(piece.to_string());
                }
                if value.get("done").and_then(|d| d.as_bool()).unwrap_or(false) {
                    return;
                }
            }
        }))
    }

    /// Run a generation to completion and return the concatenated text.
    pub async fn generate(&self, request: GenerateRequest) -> Result<String, CragError> {
        let mut stream = self.generate_stream(request).await?;
        let mut full = String::new();
        while let Some(piece) = stream.next().await {
            full.push_str(&piece?);
        }
        Ok(full)
    }
}
