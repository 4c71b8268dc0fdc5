use std::sync::Arc;

use async_trait::async_trait;
use crag_core::{CragError, Embeddings};
use crag_models::{HttpBackend, ProviderBackend, ProviderRequest};
use serde_json::{json, Value};

use crate::DEFAULT_BASE_URL;

/// [`Embeddings`] backed by Ollama's `/api/embed` endpoint.
pub struct OllamaEmbeddings {
    model: String,
    base_url: String,
    backend: Arc<dyn ProviderBackend>,
}

impl OllamaEmbeddings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            backend: Arc::new(HttpBackend::new()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn ProviderBackend>) -> Self {
        self.backend = backend;
        self
    }

    async fn embed(&self, input: &[&str]) -> Result<Vec<Vec<f32>>, CragError> {
        let url = format!("{}/api/embed", self.base_url.trim_end_matches('/'));
        let body = json!({ "model": self.model, "input": input });
        let response = self
            .backend
            .send(ProviderRequest::new(url, body))
            .await?
            .error_for_status(CragError::Embedding)?;

        let vectors = parse_embeddings(&response.body)?;
        if vectors.len() != input.len() {
            return Err(CragError::Embedding(format!(
                "expected {} embeddings, got {}",
                input.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

fn parse_embeddings(body: &Value) -> Result<Vec<Vec<f32>>, CragError> {
    let rows = body
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| CragError::Embedding("response missing 'embeddings' array".to_string()))?;
    rows.iter()
        .map(|row| {
            row.as_array()
                .ok_or_else(|| CragError::Embedding("embedding row is not an array".to_string()))?
                .iter()
                .map(|v| {
                    v.as_f64()
                        .map(|f| f as f32)
                        .ok_or_else(|| CragError::Embedding("non-numeric embedding value".to_string()))
                })
                .collect::<Result<Vec<f32>, CragError>>()
        })
        .collect()
}

#[async_trait]
impl Embeddings for OllamaEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CragError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed(texts).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, CragError> {
        self.embed(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CragError::Embedding("empty embedding response".to_string()))
    }
}
