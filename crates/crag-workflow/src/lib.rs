//! Corrective retrieval-augmented generation.
//!
//! A question flows through a small graph: retrieve documents, grade each
//! for relevance, fall back to web search when any is dropped, generate an
//! answer, and check that answer against the documents. Each corrective
//! branch (web search, regeneration) is taken at most once per question;
//! a second failure ends the run with a fixed message.
//!
//! Every model-backed decision sits behind a small trait in [`judgments`],
//! so the whole graph can be driven by deterministic stubs.

pub mod edges;
pub mod judgments;
pub mod nodes;
pub mod prompts;
mod state;
mod translator;
mod workflow;

pub use judgments::{
    AnswerGenerator, HallucinationGrader, LlmAnswerGenerator, LlmHallucinationGrader,
    LlmQuestionRouter, LlmRetrievalGrader, QuestionRouter, RetrievalGrader,
};
pub use state::{DataSource, Grade, GraphState, StateUpdate};
pub use translator::{LlmTranslator, Translator};
pub use workflow::{
    build_workflow, node_names, Answer, Outcome, RagComponents, RagPipeline, WorkflowOptions,
    HALLUCINATION_MESSAGE, NOT_RELEVANT_MESSAGE, NO_ANSWER_MESSAGE,
};
