mod chat;
mod config;
mod embeddings;

pub use chat::OpenAiChatModel;
pub use config::OpenAiConfig;
pub use embeddings::OpenAiEmbeddings;
