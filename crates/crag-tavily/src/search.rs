use std::sync::Arc;

use async_trait::async_trait;
use crag_core::CragError;
use crag_models::{HttpBackend, ProviderBackend, ProviderRequest};
use crag_retrieval::{SearchResult, WebSearch};
use serde::Deserialize;
use serde_json::{json, Value};

/// Settings for [`TavilyClient`].
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub max_results: usize,
    pub search_depth: String,
    pub base_url: String,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            max_results: 5,
            search_depth: "basic".to_string(),
            base_url: "https://api.tavily.com".to_string(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = depth.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Web search over Tavily's `/search` endpoint.
pub struct TavilyClient {
    config: TavilyConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> Self {
        Self {
            config,
            backend: Arc::new(HttpBackend::new()),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ProviderBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn config(&self) -> &TavilyConfig {
        &self.config
    }

    fn request_body(&self, query: &str) -> Value {
        json!({
            "api_key": self.config.api_key,
            "query": query,
            "max_results": self.config.max_results,
            "search_depth": self.config.search_depth,
        })
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CragError> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let request = ProviderRequest::new(url, self.request_body(query))
            .with_bearer(&self.config.api_key);

        let response = self
            .backend
            .send(request)
            .await
            .map_err(|e| CragError::WebSearch(e.to_string()))?
            .error_for_status(CragError::WebSearch)?;

        let parsed: SearchResponse = serde_json::from_value(response.body)
            .map_err(|e| CragError::WebSearch(format!("unexpected tavily response: {e}")))?;
        tracing::debug!(query, results = parsed.results.len(), "tavily search");
        Ok(parsed.results)
    }
}
