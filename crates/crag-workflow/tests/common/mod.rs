#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crag_core::CragError;
use crag_retrieval::{Document, Retriever, SearchResult, WebSearch};
use crag_workflow::{
    AnswerGenerator, DataSource, Grade, HallucinationGrader, QuestionRouter, RagComponents,
    RetrievalGrader,
};

pub struct StubRetriever {
    pub docs: Vec<Document>,
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<Document>, CragError> {
        Ok(self.docs.clone())
    }
}

pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<Document>, CragError> {
        Err(CragError::Retriever("index offline".to_string()))
    }
}

/// Returns fixed snippets and counts calls.
#[derive(Default)]
pub struct StubSearch {
    pub snippets: Vec<String>,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn new(snippets: &[&str]) -> Self {
        Self {
            snippets: snippets.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, CragError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snippets.iter().map(SearchResult::new).collect())
    }
}

/// Grades `yes` for documents whose content is in `relevant`.
pub struct SetGrader {
    pub relevant: HashSet<String>,
}

impl SetGrader {
    pub fn new(relevant: &[&str]) -> Self {
        Self {
            relevant: relevant.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl RetrievalGrader for SetGrader {
    async fn grade(&self, _question: &str, document: &Document) -> Result<Grade, CragError> {
        Ok(if self.relevant.contains(&document.content) {
            Grade::Yes
        } else {
            Grade::No
        })
    }
}

pub struct ConstGrader(pub Grade);

#[async_trait]
impl RetrievalGrader for ConstGrader {
    async fn grade(&self, _question: &str, _document: &Document) -> Result<Grade, CragError> {
        Ok(self.0)
    }
}

/// Answers "answer 1", "answer 2", ... and remembers the documents it saw.
#[derive(Default)]
pub struct CountingGenerator {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<String>>>,
}

impl CountingGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerGenerator for CountingGenerator {
    async fn generate(&self, _question: &str, documents: &[Document]) -> Result<String, CragError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(documents.iter().map(|d| d.content.clone()).collect());
        }
        Ok(format!("answer {n}"))
    }
}

/// Replays grades in order, repeating the last one.
pub struct SequenceHallucinationGrader {
    grades: Vec<Grade>,
    calls: AtomicUsize,
}

impl SequenceHallucinationGrader {
    pub fn new(grades: Vec<Grade>) -> Self {
        Self {
            grades,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(grade: Grade) -> Self {
        Self::new(vec![grade])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HallucinationGrader for SequenceHallucinationGrader {
    async fn grade(&self, _documents: &[Document], _generation: &str) -> Result<Grade, CragError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self
            .grades
            .get(i)
            .or(self.grades.last())
            .unwrap_or(&Grade::No))
    }
}

/// Returns a fixed router label, which may be out of vocabulary.
pub struct LabelRouter(pub &'static str);

#[async_trait]
impl QuestionRouter for LabelRouter {
    async fn route(&self, _question: &str) -> Result<DataSource, CragError> {
        DataSource::from_label(self.0)
    }
}

pub fn docs(contents: &[&str]) -> Vec<Document> {
    contents
        .iter()
        .enumerate()
        .map(|(i, c)| Document::new(format!("d{i}"), *c))
        .collect()
}

/// Handles to the stubs behind a [`RagComponents`], for assertions.
pub struct Stubs {
    pub search: Arc<StubSearch>,
    pub generator: Arc<CountingGenerator>,
    pub hallucination: Arc<SequenceHallucinationGrader>,
}

pub fn components(
    retrieved: &[&str],
    grader: Arc<dyn RetrievalGrader>,
    search: &[&str],
    hallucination: Vec<Grade>,
) -> (RagComponents, Stubs) {
    let stubs = Stubs {
        search: Arc::new(StubSearch::new(search)),
        generator: Arc::new(CountingGenerator::default()),
        hallucination: Arc::new(SequenceHallucinationGrader::new(hallucination)),
    };
    let components = RagComponents {
        retriever: Arc::new(StubRetriever { docs: docs(retrieved) }),
        web_search: stubs.search.clone(),
        router: None,
        retrieval_grader: grader,
        generator: stubs.generator.clone(),
        hallucination_grader: stubs.hallucination.clone(),
    };
    (components, stubs)
}
