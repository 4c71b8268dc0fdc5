use serde::Deserialize;

/// Backend that serves a model or embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Openai,
    Ollama,
    /// Deterministic offline embeddings; only valid for `[embeddings]`.
    Fake,
}

/// The model behind the RAG judgments and answer generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Openai,
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: None,
            temperature: 0.0,
        }
    }
}

/// Streaming chat against a local Ollama server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    /// Number of previous exchanges (user + assistant) replayed in each prompt.
    pub memory_length: usize,
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gemma3:12b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.7,
            memory_length: 3,
            system_prompt: "You are a helpful AI assistant. Answer the user's questions \
                            kindly and accurately."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Pages indexed by `crag index`.
    pub urls: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Documents returned per retrieval.
    pub top_k: usize,
    pub persist_dir: String,
    pub collection: String,
    pub route_questions: bool,
    pub recursion_limit: usize,
    pub translate_to: String,
    /// Overrides `$USER_AGENT` for page loading.
    pub user_agent: Option<String>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            urls: vec![
                "https://lilianweng.github.io/posts/2023-06-23-agent/".to_string(),
                "https://lilianweng.github.io/posts/2023-03-15-prompt-engineering/".to_string(),
                "https://lilianweng.github.io/posts/2023-10-25-adv-attack-llm/".to_string(),
            ],
            chunk_size: 250,
            chunk_overlap: 0,
            top_k: 4,
            persist_dir: "./chroma_db".to_string(),
            collection: "rag-chroma".to_string(),
            route_questions: false,
            recursion_limit: 25,
            translate_to: "Korean".to_string(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    /// Vector size for the `fake` provider.
    pub dimensions: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Openai,
            model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: None,
            dimensions: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TavilySection {
    pub api_key_env: String,
    pub max_results: usize,
    pub search_depth: String,
    pub base_url: Option<String>,
}

impl Default for TavilySection {
    fn default() -> Self {
        Self {
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 5,
            search_depth: "basic".to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
    /// When set, logs also go to a daily-rolling file in this directory.
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}
