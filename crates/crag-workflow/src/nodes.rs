//! Graph steps. Each takes the current state and the collaborator it needs
//! and returns only the fields it changes.

use crag_core::CragError;
use crag_retrieval::{Document, Retriever, WebSearch};

use crate::judgments::{AnswerGenerator, HallucinationGrader, QuestionRouter, RetrievalGrader};
use crate::state::{GraphState, StateUpdate};
use crate::workflow::{HALLUCINATION_MESSAGE, NOT_RELEVANT_MESSAGE};

/// Replace `documents` with what the retriever returns for the question.
pub async fn retrieve(state: &GraphState, retriever: &dyn Retriever) -> Result<StateUpdate, CragError> {
    tracing::info!(step = "retrieve", question = state.question());
    let documents = retriever.retrieve(state.question()).await?;
    tracing::debug!(count = documents.len(), "retrieved documents");
    Ok(StateUpdate {
        documents: Some(documents),
        ..Default::default()
    })
}

/// Keep the documents graded relevant. `web_search` is set when any
/// document was dropped.
pub async fn grade_documents(
    state: &GraphState,
    grader: &dyn RetrievalGrader,
) -> Result<StateUpdate, CragError> {
    tracing::info!(step = "grade_documents");
    let documents = state.require_documents()?;
    let mut kept = Vec::with_capacity(documents.len());
    let mut dropped = 0usize;
    for document in documents {
        if grader.grade(state.question(), document).await?.is_yes() {
            tracing::debug!(id = %document.id, "document relevant");
            kept.push(document.clone());
        } else {
            tracing::warn!(id = %document.id, "document not relevant");
            dropped += 1;
        }
    }
    tracing::info!(kept = kept.len(), dropped, "graded documents");
    Ok(StateUpdate {
        documents: Some(kept),
        web_search: Some(dropped > 0),
        ..Default::default()
    })
}

/// Search the web and append the joined result contents as one document.
pub async fn web_search(state: &GraphState, search: &dyn WebSearch) -> Result<StateUpdate, CragError> {
    tracing::info!(step = "web_search", question = state.question());
    let results = search.search(state.question()).await?;
    let joined = results
        .iter()
        .map(|r| r.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let mut web_doc = Document::from_content(joined).with_metadata("source", "web_search");
    if let Some(first) = results.first().filter(|r| !r.url.is_empty()) {
        web_doc = web_doc.with_metadata("url", first.url.as_str());
    }
    tracing::debug!(results = results.len(), "web search results");

    let mut documents = state.documents.clone().unwrap_or_default();
    documents.push(web_doc);
    Ok(StateUpdate {
        documents: Some(documents),
        ..Default::default()
    })
}

pub async fn generate(state: &GraphState, generator: &dyn AnswerGenerator) -> Result<StateUpdate, CragError> {
    let documents = state.require_documents()?;
    tracing::info!(step = "generate", documents = documents.len());
    let generation = generator.generate(state.question(), documents).await?;
    Ok(StateUpdate {
        generation: Some(generation),
        ..Default::default()
    })
}

/// Grade the current generation against the documents.
pub async fn check_hallucination(
    state: &GraphState,
    grader: &dyn HallucinationGrader,
) -> Result<StateUpdate, CragError> {
    tracing::info!(step = "check_hallucination");
    let documents = state.require_documents()?;
    let generation = state
        .generation
        .as_deref()
        .ok_or_else(|| CragError::Graph("hallucination check before generation".to_string()))?;
    let grade = grader.grade(documents, generation).await?;
    if grade.is_yes() {
        tracing::info!("generation is grounded in documents");
    } else {
        tracing::warn!("generation is not grounded in documents");
    }
    Ok(StateUpdate {
        grounded: Some(grade),
        ..Default::default()
    })
}

pub async fn route_question(state: &GraphState, router: &dyn QuestionRouter) -> Result<StateUpdate, CragError> {
    tracing::info!(step = "route_question", question = state.question());
    let datasource = router.route(state.question()).await?;
    tracing::info!(?datasource, "routed question");
    Ok(StateUpdate {
        datasource: Some(datasource),
        ..Default::default()
    })
}

pub fn mark_web_search_done(_state: &GraphState) -> StateUpdate {
    StateUpdate {
        web_search_done: Some(true),
        ..Default::default()
    }
}

pub fn mark_hallucination(_state: &GraphState) -> StateUpdate {
    tracing::warn!("retrying generation once");
    StateUpdate {
        hallucination_checked: Some(true),
        ..Default::default()
    }
}

/// Replace the answer with the fixed hallucination message.
pub fn end_hallucination(_state: &GraphState) -> StateUpdate {
    tracing::warn!("generation still not grounded, giving up");
    StateUpdate {
        generation: Some(HALLUCINATION_MESSAGE.to_string()),
        ..Default::default()
    }
}

pub fn end_not_relevant(_state: &GraphState) -> StateUpdate {
    tracing::warn!("no relevant documents after web search");
    StateUpdate {
        generation: Some(NOT_RELEVANT_MESSAGE.to_string()),
        ..Default::default()
    }
}
