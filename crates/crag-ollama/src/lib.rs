//! Ollama integration.
//!
//! * [`OllamaClient`] streams raw prompt completions from `/api/generate`;
//!   the chat application is built on it.
//! * [`OllamaChatModel`] implements [`crag_core::ChatModel`] over `/api/chat`.
//! * [`OllamaEmbeddings`] implements [`crag_core::Embeddings`] over `/api/embed`.

mod chat;
mod config;
mod embeddings;
mod generate;

pub use chat::OllamaChatModel;
pub use config::{OllamaConfig, DEFAULT_BASE_URL};
pub use embeddings::OllamaEmbeddings;
pub use generate::{GenerateRequest, OllamaClient, TokenStream};
