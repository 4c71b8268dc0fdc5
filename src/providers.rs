//! Builds the configured model, embeddings and search clients.

use std::sync::Arc;

use crag_config::{CragConfig, Provider};
use crag_core::{ChatModel, CragError, Embeddings};
use crag_ollama::{OllamaChatModel, OllamaClient, OllamaConfig, OllamaEmbeddings, DEFAULT_BASE_URL};
use crag_openai::{OpenAiChatModel, OpenAiConfig, OpenAiEmbeddings};
use crag_retrieval::{FakeEmbeddings, WebSearch};
use crag_tavily::{TavilyClient, TavilyConfig};

/// The model behind routing, grading, generation and translation.
pub fn judgment_model(config: &CragConfig) -> Result<Arc<dyn ChatModel>, CragError> {
    let model = &config.model;
    match model.provider {
        Provider::Openai => {
            let mut openai = OpenAiConfig::new(config.model_api_key()?, &model.model)
                .with_temperature(model.temperature);
            if let Some(url) = &model.base_url {
                openai = openai.with_base_url(url);
            }
            Ok(Arc::new(OpenAiChatModel::new(openai)))
        }
        Provider::Ollama => {
            let ollama = OllamaConfig::new(&model.model)
                .with_base_url(model.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
                .with_temperature(model.temperature);
            Ok(Arc::new(OllamaChatModel::new(ollama)))
        }
        Provider::Fake => Err(CragError::Config(
            "model.provider 'fake' is only available for embeddings".to_string(),
        )),
    }
}

pub fn embeddings(config: &CragConfig) -> Result<Arc<dyn Embeddings>, CragError> {
    let section = &config.embeddings;
    match section.provider {
        Provider::Openai => {
            let mut openai = OpenAiConfig::new(config.embeddings_api_key()?, &section.model);
            if let Some(url) = &section.base_url {
                openai = openai.with_base_url(url);
            }
            Ok(Arc::new(OpenAiEmbeddings::new(openai)))
        }
        Provider::Ollama => Ok(Arc::new(
            OllamaEmbeddings::new(&section.model)
                .with_base_url(section.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
        )),
        Provider::Fake => Ok(Arc::new(FakeEmbeddings::new(section.dimensions))),
    }
}

pub fn web_search(config: &CragConfig) -> Result<Arc<dyn WebSearch>, CragError> {
    let section = &config.tavily;
    let mut tavily = TavilyConfig::new(config.tavily_api_key()?)
        .with_max_results(section.max_results)
        .with_search_depth(&section.search_depth);
    if let Some(url) = &section.base_url {
        tavily = tavily.with_base_url(url);
    }
    Ok(Arc::new(TavilyClient::new(tavily)))
}

/// Streaming generation client for `crag chat`.
pub fn chat_client(config: &CragConfig) -> OllamaClient {
    let chat = &config.chat;
    OllamaClient::new(
        OllamaConfig::new(&chat.model)
            .with_base_url(&chat.base_url)
            .with_temperature(chat.temperature),
    )
}
