use std::sync::Arc;

use async_trait::async_trait;
use crag_core::{CragError, Embeddings};
use crag_models::{HttpBackend, ProviderBackend, ProviderRequest};
use serde_json::{json, Value};

use crate::OpenAiConfig;

/// [`Embeddings`] over the `/embeddings` endpoint.
pub struct OpenAiEmbeddings {
    config: OpenAiConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl OpenAiEmbeddings {
    /// `config.model` names the embedding model, e.g. `text-embedding-3-small`.
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

    async fn embed(&self, input: &[&str]) -> Result<Vec<Vec<f32>>, CragError> {
        let body = json!({ "model": self.config.model, "input": input });
        let response = self
            .backend
            .send(
                ProviderRequest::new(self.config.endpoint("embeddings"), body)
                    .with_bearer(&self.config.api_key),
            )
            .await?
            .error_for_status(CragError::Embedding)?;

        let mut rows: Vec<(usize, Vec<f32>)> = response.body["data"]
            .as_array()
            .ok_or_else(|| CragError::Embedding("response missing 'data' array".to_string()))?
            .iter()
            .enumerate()
            .map(|(position, row)| parse_row(position, row))
            .collect::<Result<_, _>>()?;
        rows.sort_by_key(|(index, _)| *index);

        if rows.len() != input.len() {
            return Err(CragError::Embedding(format!(
                "expected {} embeddings, got {}",
                input.len(),
                rows.len()
            )));
        }
        Ok(rows.into_iter().map(|(_, v)| v).collect())
    }
}

fn parse_row(position: usize, row: &Value) -> Result<(usize, Vec<f32>), CragError> {
    let index = row["index"].as_u64().map(|i| i as usize).unwrap_or(position);
    let vector = row["embedding"]
        .as_array()
        .ok_or_else(|| CragError::Embedding("row missing 'embedding'".to_string()))?
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| CragError::Embedding("non-numeric embedding value".to_string()))
        })
        .collect::<Result<Vec<f32>, CragError>>()?;
    Ok((index, vector))
}

#[async_trait]
impl Embeddings for OpenAiEmbeddings {
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
