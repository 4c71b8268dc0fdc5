use std::fmt;

use crag_core::CragError;
use crag_retrieval::Document;

/// A binary judgment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Yes,
    No,
}

impl Grade {
    /// `"yes"` in any case, ignoring surrounding whitespace, is [`Grade::Yes`];
    /// every other label is [`Grade::No`].
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("yes") {
            Grade::Yes
        } else {
            Grade::No
        }
    }

    pub fn is_yes(self) -> bool {
        self == Grade::Yes
    }
}

/// Where the question router sends a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    WebSearch,
    Vectorstore,
}

impl DataSource {
    /// Parse a router label. Labels outside the closed set are an error.
    pub fn from_label(label: &str) -> Result<Self, CragError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "web_search" | "websearch" | "web-search" => Ok(DataSource::WebSearch),
            "vectorstore" => Ok(DataSource::Vectorstore),
            other => Err(CragError::Judgment(format!(
                "router returned unknown datasource '{other}'"
            ))),
        }
    }
}

/// The record threaded through one run of the RAG graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphState {
    question: String,
    pub documents: Option<Vec<Document>>,
    /// Set by document grading when any document was dropped.
    pub web_search: bool,
    pub generation: Option<String>,
    pub web_search_done: bool,
    pub hallucination_checked: bool,
    pub datasource: Option<DataSource>,
    pub grounded: Option<Grade>,
}

impl GraphState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: None,
            web_search: false,
            generation: None,
            web_search_done: false,
            hallucination_checked: false,
            datasource: None,
            grounded: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// The documents gathered so far, or an error if no step has produced
    /// any yet.
    pub fn require_documents(&self) -> Result<&[Document], CragError> {
        self.documents
            .as_deref()
            .ok_or_else(|| CragError::Graph("documents read before retrieval".to_string()))
    }

    /// `"Yes"` / `"No"` rendering of the web search flag.
    pub fn web_search_label(&self) -> &'static str {
        if self.web_search {
            "Yes"
        } else {
            "No"
        }
    }
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "question={:?} documents={} web_search={} generation={}",
            self.question,
            self.documents.as_ref().map_or(0, Vec::len),
            self.web_search_label(),
            if self.generation.is_some() { "set" } else { "unset" }
        )
    }
}

/// The fields a step changes. `None` leaves the current value alone.
///
/// There is no `question` field: the question is fixed for the whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub documents: Option<Vec<Document>>,
    pub web_search: Option<bool>,
    pub generation: Option<String>,
    pub web_search_done: Option<bool>,
    pub hallucination_checked: Option<bool>,
    pub datasource: Option<DataSource>,
    pub grounded: Option<Grade>,
}

impl crag_graph::State for GraphState {
    type Update = StateUpdate;

    fn merge(&mut self, update: StateUpdate) {
        if let Some(documents) = update.documents {
            self.documents = Some(documents);
        }
        if let Some(web_search) = update.web_search {
            self.web_search = web_search;
        }
        if let Some(generation) = update.generation {
            self.generation = Some(generation);
        }
        if let Some(done) = update.web_search_done {
            self.web_search_done = done;
        }
        if let Some(checked) = update.hallucination_checked {
            self.hallucination_checked = checked;
        }
        if let Some(datasource) = update.datasource {
            self.datasource = Some(datasource);
        }
        if let Some(grounded) = update.grounded {
            self.grounded = Some(grounded);
        }
    }
}
