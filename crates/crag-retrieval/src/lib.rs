//! Retrieval collaborators for the RAG pipeline.
//!
//! The pipeline only depends on the [`Retriever`] and [`WebSearch`] traits;
//! the loader, splitter and vector store here are what `crag index` uses to
//! build a retriever from a list of URLs.

mod document;
mod fake;
mod loader;
mod retriever;
mod splitter;
mod vectorstore;
mod websearch;

pub use document::Document;
pub use fake::FakeEmbeddings;
pub use loader::{html_to_text, Loader, WebLoader, DEFAULT_USER_AGENT};
pub use retriever::Retriever;
pub use splitter::{RecursiveCharacterTextSplitter, TextSplitter};
pub use vectorstore::{InMemoryVectorStore, VectorStore, VectorStoreRetriever};
pub use websearch::{SearchResult, WebSearch};
