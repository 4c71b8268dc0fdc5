/// Default address of a locally running Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Connection settings for an Ollama server and the model to use.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub model: String,
    pub base_url: String,
    /// Sampling temperature; the server default applies when unset.
    pub temperature: Option<f64>,
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url.trim_end_matches('/'))
    }
}
