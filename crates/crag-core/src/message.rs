use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CragError;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    #[serde(rename = "user")]
    Human,
    #[serde(rename = "assistant")]
    Ai,
}

impl Role {
    /// Wire name used by OpenAI-style and Ollama chat APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Ai => "assistant",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_ai(&self) -> bool {
        self.role == Role::Ai
    }

    pub fn is_human(&self) -> bool {
        self.role == Role::Human
    }
}

/// Output format a model is asked to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// A single JSON object.
    Json,
}

/// A request to a chat model.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Overrides the model's configured temperature when set.
    pub temperature: Option<f64>,
    pub format: ResponseFormat,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            format: ResponseFormat::Text,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}

/// A complete chat model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub message: Message,
}

impl ChatResponse {
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            message: Message::ai(content),
        }
    }

    pub fn content(&self) -> &str {
        self.message.content()
    }
}

/// A chat-completion capable language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CragError>;
}
