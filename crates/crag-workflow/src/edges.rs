//! Transition functions: pure maps from state to a routing label.

use std::fmt;

use crate::state::{DataSource, Grade, GraphState};

/// Labels produced by the transition functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    WebSearch,
    Vectorstore,
    Generate,
    NotRelevant,
    Useful,
    NotSupported,
    Hallucinated,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::WebSearch => "websearch",
            Route::Vectorstore => "vectorstore",
            Route::Generate => "generate",
            Route::NotRelevant => "not_relevant",
            Route::Useful => "useful",
            Route::NotSupported => "not_supported",
            Route::Hallucinated => "hallucinated",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A missing datasource means the router did not run; retrieval is the
/// default entry.
pub fn route_question(state: &GraphState) -> Route {
    match state.datasource {
        Some(DataSource::WebSearch) => Route::WebSearch,
        Some(DataSource::Vectorstore) | None => Route::Vectorstore,
    }
}

pub fn decide_to_generate(state: &GraphState) -> Route {
    if state.web_search {
        Route::WebSearch
    } else {
        Route::Generate
    }
}

/// [`decide_to_generate`] with the web search guard applied: after one web
/// search, generate from whatever survived grading, or give up when nothing
/// did.
pub fn after_grading(state: &GraphState) -> Route {
    match decide_to_generate(state) {
        Route::WebSearch if state.web_search_done => {
            if state.documents.as_ref().is_some_and(|d| !d.is_empty()) {
                tracing::warn!("web search already done, generating from remaining documents");
                Route::Generate
            } else {
                Route::NotRelevant
            }
        }
        route => route,
    }
}

/// `Useful` when the generation is grounded; otherwise one retry, then
/// `Hallucinated`.
pub fn grade_generation(state: &GraphState) -> Route {
    match state.grounded {
        Some(Grade::Yes) => Route::Useful,
        _ if state.hallucination_checked => Route::Hallucinated,
        _ => Route::NotSupported,
    }
}
