//! Model-backed decisions used by the graph.
//!
//! Each judgment is a trait so tests can substitute stubs; the `Llm*`
//! implementations format a fixed prompt, call a [`ChatModel`] and parse the
//! reply.

use std::sync::Arc;

use async_trait::async_trait;
use crag_core::{ChatModel, ChatRequest, CragError, Message, ResponseFormat};
use crag_retrieval::Document;
use serde_json::Value;

use crate::prompts;
use crate::state::{DataSource, Grade};

/// Decides whether a question goes to the vector store or to web search.
#[async_trait]
pub trait QuestionRouter: Send + Sync {
    async fn route(&self, question: &str) -> Result<DataSource, CragError>;
}

/// Judges whether one retrieved document is relevant to the question.
#[async_trait]
pub trait RetrievalGrader: Send + Sync {
    async fn grade(&self, question: &str, document: &Document) -> Result<Grade, CragError>;
}

/// Writes an answer from the question and supporting documents.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, documents: &[Document]) -> Result<String, CragError>;
}

/// Judges whether an answer is grounded in the documents.
#[async_trait]
pub trait HallucinationGrader: Send + Sync {
    async fn grade(&self, documents: &[Document], generation: &str) -> Result<Grade, CragError>;
}

fn strip_code_fence(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Extract the string value of `key` from a JSON object reply.
///
/// Replies that are not a JSON object, lack the key, or hold a non-string
/// value are parsing errors.
pub fn parse_json_label(output: &str, key: &str) -> Result<String, CragError> {
    let body = strip_code_fence(output);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CragError::Parsing(format!("invalid JSON from model ({e}): {output}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| CragError::Parsing(format!("expected a JSON object, got: {output}")))?;
    match object.get(key) {
        Some(Value::String(label)) => Ok(label.clone()),
        Some(other) => Err(CragError::Parsing(format!(
            "key '{key}' is not a string: {other}"
        ))),
        None => Err(CragError::Parsing(format!("missing key '{key}' in: {output}"))),
    }
}

async fn ask(model: &dyn ChatModel, system: &str, human: String, format: ResponseFormat) -> Result<String, CragError> {
    let request = ChatRequest::new(vec![Message::system(system), Message::human(human)]).with_format(format);
    let response = model.chat(request).await?;
    Ok(response.message.content)
}

pub struct LlmQuestionRouter {
    model: Arc<dyn ChatModel>,
}

impl LlmQuestionRouter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl QuestionRouter for LlmQuestionRouter {
    async fn route(&self, question: &str) -> Result<DataSource, CragError> {
        let reply = ask(
            self.model.as_ref(),
            prompts::ROUTER_SYSTEM,
            prompts::router_human(question),
            ResponseFormat::Json,
        )
        .await?;
        let label = parse_json_label(&reply, "datasource")?;
        tracing::debug!(%label, "router label");
        DataSource::from_label(&label)
    }
}

pub struct LlmRetrievalGrader {
    model: Arc<dyn ChatModel>,
}

impl LlmRetrievalGrader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl RetrievalGrader for LlmRetrievalGrader {
    async fn grade(&self, question: &str, document: &Document) -> Result<Grade, CragError> {
        let reply = ask(
            self.model.as_ref(),
            prompts::RETRIEVAL_GRADER_SYSTEM,
            prompts::retrieval_grader_human(question, &document.content),
            ResponseFormat::Json,
        )
        .await?;
        Ok(Grade::from_label(&parse_json_label(&reply, "score")?))
    }
}

pub struct LlmAnswerGenerator {
    model: Arc<dyn ChatModel>,
}

impl LlmAnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(&self, question: &str, documents: &[Document]) -> Result<String, CragError> {
        ask(
            self.model.as_ref(),
            prompts::GENERATOR_SYSTEM,
            prompts::generator_human(question, &prompts::format_documents(documents)),
            ResponseFormat::Text,
        )
        .await
    }
}

pub struct LlmHallucinationGrader {
    model: Arc<dyn ChatModel>,
}

impl LlmHallucinationGrader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl HallucinationGrader for LlmHallucinationGrader {
    async fn grade(&self, documents: &[Document], generation: &str) -> Result<Grade, CragError> {
        let reply = ask(
            self.model.as_ref(),
            prompts::HALLUCINATION_GRADER_SYSTEM,
            prompts::hallucination_grader_human(&prompts::format_documents(documents), generation),
            ResponseFormat::Json,
        )
        .await?;
        Ok(Grade::from_label(&parse_json_label(&reply, "score")?))
    }
}
