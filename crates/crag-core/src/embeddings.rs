use async_trait::async_trait;

use crate::CragError;

/// Turns text into dense vectors.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed a batch of documents, one vector per input, in input order.
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CragError>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, CragError>;
}
