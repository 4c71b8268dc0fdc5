//! Core types shared by every crag crate.
//!
//! Providers implement [`ChatModel`] and [`Embeddings`]; everything above them
//! (judgments, pipelines, the CLI) is written against these traits so that
//! deterministic doubles can stand in for live models in tests.

mod embeddings;
mod error;
mod message;

pub use embeddings::Embeddings;
pub use error::CragError;
pub use message::{ChatModel, ChatRequest, ChatResponse, Message, ResponseFormat, Role};
