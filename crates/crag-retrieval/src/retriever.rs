use async_trait::async_trait;
use crag_core::CragError;

use crate::Document;

/// Returns the documents most relevant to a query, best first.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, CragError>;
}
