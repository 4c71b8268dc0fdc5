use thiserror::Error;

/// Error type shared across the workspace.
///
/// Variants carry a human-readable description; the variant itself names the
/// collaborator that failed.
#[derive(Debug, Error)]
pub enum CragError {
    #[error("model error: {0}")]
    Model(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("judgment error: {0}")]
    Judgment(String),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("vector store error: {0}")]
    VectorStore(String),
    #[error("retriever error: {0}")]
    Retriever(String),
    #[error("loader error: {0}")]
    Loader(String),
    #[error("web search error: {0}")]
    WebSearch(String),
    #[error("graph error: {0}")]
    Graph(String),
    #[error("config error: {0}")]
    Config(String),
}
