mod format;
mod sections;
mod source;

pub use format::{parse_config, ConfigFormat};
pub use sections::{
    ChatConfig, EmbeddingsConfig, LoggingConfig, ModelConfig, Provider, RagConfig, TavilySection,
};
pub use source::{
    discover_and_load, discover_config_path, load_from_file, load_from_source, ConfigSource,
    FileConfigSource, StringConfigSource,
};

use std::path::Path;

use crag_core::CragError;
use serde::Deserialize;

/// Top-level configuration, loaded from TOML / JSON / YAML.
///
/// Every section is optional; missing sections and fields take their
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CragConfig {
    pub model: ModelConfig,
    pub chat: ChatConfig,
    pub rag: RagConfig,
    pub embeddings: EmbeddingsConfig,
    pub tavily: TavilySection,
    pub logging: LoggingConfig,
}

impl CragConfig {
    /// Load configuration, searching the standard locations when `path` is
    /// `None`. See [`discover_config_path`].
    pub fn load(path: Option<&Path>) -> Result<Self, CragError> {
        let config: Self = discover_and_load(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(source: &dyn ConfigSource) -> Result<Self, CragError> {
        let config: Self = load_from_source(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, CragError> {
        let config: Self = parse_config(content, format)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no component can run with.
    pub fn validate(&self) -> Result<(), CragError> {
        let invalid = |msg: String| Err(CragError::Config(msg));
        if self.model.provider == Provider::Fake {
            return invalid("model.provider 'fake' is only available for embeddings".into());
        }
        if self.rag.chunk_size == 0 {
            return invalid("rag.chunk_size must be positive".into());
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return invalid(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            ));
        }
        if self.rag.top_k == 0 {
            return invalid("rag.top_k must be positive".into());
        }
        if self.rag.recursion_limit == 0 {
            return invalid("rag.recursion_limit must be positive".into());
        }
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return invalid(format!(
                "chat.temperature must be within 0.0..=2.0, got {}",
                self.chat.temperature
            ));
        }
        Ok(())
    }

    pub fn model_api_key(&self) -> Result<String, CragError> {
        resolve_env(&self.model.api_key_env)
    }

    pub fn embeddings_api_key(&self) -> Result<String, CragError> {
        resolve_env(&self.embeddings.api_key_env)
    }

    pub fn tavily_api_key(&self) -> Result<String, CragError> {
        resolve_env(&self.tavily.api_key_env)
    }

    /// User agent for page loading: `rag.user_agent`, then `$USER_AGENT`.
    pub fn user_agent(&self) -> Option<String> {
        self.rag
            .user_agent
            .clone()
            .or_else(|| std::env::var("USER_AGENT").ok().filter(|v| !v.is_empty()))
    }
}

/// Read a secret from the environment variable `name`.
pub fn resolve_env(name: &str) -> Result<String, CragError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CragError::Config(format!("environment variable '{name}' not set"))),
    }
}
