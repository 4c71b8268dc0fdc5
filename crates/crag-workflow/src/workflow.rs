use std::sync::Arc;

use crag_core::{ChatModel, CragError};
use crag_graph::{CompiledGraph, FnNode, GraphStream, StateGraph, DEFAULT_RECURSION_LIMIT, END};
use crag_retrieval::{Document, Retriever, WebSearch};
use futures::StreamExt;

use crate::edges;
use crate::judgments::{
    AnswerGenerator, HallucinationGrader, LlmAnswerGenerator, LlmHallucinationGrader,
    LlmQuestionRouter, LlmRetrievalGrader, QuestionRouter, RetrievalGrader,
};
use crate::nodes;
use crate::state::{Grade, GraphState};

/// Answer text when the generation is still ungrounded after one retry.
// English form of "환각이 감지되었습니다. 답변을 생성할 수 없습니다."
pub const HALLUCINATION_MESSAGE: &str =
    "Hallucination detected. A grounded answer could not be generated.";
/// Answer text when neither retrieval nor web search found relevant documents.
pub const NOT_RELEVANT_MESSAGE: &str =
    "No relevant documents were found for this question, so no answer was generated.";
/// Answer text when a run ends without any generation.
pub const NO_ANSWER_MESSAGE: &str = "Failed to generate an answer.";

/// Node names used in the RAG graph.
pub mod node_names {
    pub const ROUTE_QUESTION: &str = "route_question";
    pub const RETRIEVE: &str = "retrieve";
    pub const RELEVANCE_CHECKER: &str = "relevance_checker";
    pub const WEBSEARCH: &str = "websearch";
    pub const MARK_WEB_SEARCH_DONE: &str = "mark_web_search_done";
    pub const GENERATE: &str = "generate";
    pub const HALLUCINATION_CHECKER: &str = "hallucination_checker";
    pub const MARK_HALLUCINATION: &str = "mark_hallucination";
    pub const END_HALLUCINATION: &str = "end_hallucination";
    pub const END_NOT_RELEVANT: &str = "end_not_relevant";
}

use node_names::*;

/// The collaborators the graph's steps call into.
pub struct RagComponents {
    pub retriever: Arc<dyn Retriever>,
    pub web_search: Arc<dyn WebSearch>,
    /// Required when question routing is enabled.
    pub router: Option<Arc<dyn QuestionRouter>>,
    pub retrieval_grader: Arc<dyn RetrievalGrader>,
    pub generator: Arc<dyn AnswerGenerator>,
    pub hallucination_grader: Arc<dyn HallucinationGrader>,
}

impl RagComponents {
    /// Back every judgment with the same chat model.
    pub fn from_model(
        model: Arc<dyn ChatModel>,
        retriever: Arc<dyn Retriever>,
        web_search: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            retriever,
            web_search,
            router: Some(Arc::new(LlmQuestionRouter::new(model.clone()))),
            retrieval_grader: Arc::new(LlmRetrievalGrader::new(model.clone())),
            generator: Arc::new(LlmAnswerGenerator::new(model.clone())),
            hallucination_grader: Arc::new(LlmHallucinationGrader::new(model)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Start with the question router instead of retrieval.
    pub route_questions: bool,
    pub recursion_limit: usize,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            route_questions: false,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

/// Assemble the corrective RAG graph.
///
/// ```text
/// [route_question] -> retrieve | websearch
/// retrieve -> relevance_checker -> generate | websearch | end_not_relevant
/// websearch -> mark_web_search_done -> relevance_checker
/// generate -> hallucination_checker -> END | mark_hallucination | end_hallucination
/// mark_hallucination -> generate
/// ```
pub fn build_workflow(
    components: RagComponents,
    options: WorkflowOptions,
) -> Result<CompiledGraph<GraphState>, CragError> {
    let RagComponents {
        retriever,
        web_search,
        router,
        retrieval_grader,
        generator,
        hallucination_grader,
    } = components;

    let mut graph = StateGraph::new()
        .add_node(
            RETRIEVE,
            FnNode::new(move |state: GraphState| {
                let retriever = retriever.clone();
                async move { nodes::retrieve(&state, retriever.as_ref()).await }
            }),
        )
        .add_node(
            RELEVANCE_CHECKER,
            FnNode::new(move |state: GraphState| {
                let grader = retrieval_grader.clone();
                async move { nodes::grade_documents(&state, grader.as_ref()).await }
            }),
        )
        .add_node(
            WEBSEARCH,
            FnNode::new(move |state: GraphState| {
                let search = web_search.clone();
                async move { nodes::web_search(&state, search.as_ref()).await }
            }),
        )
        .add_node(
            MARK_WEB_SEARCH_DONE,
            FnNode::new(|state: GraphState| async move {
                Ok::<_, CragError>(nodes::mark_web_search_done(&state))
            }),
        )
        .add_node(
            GENERATE,
            FnNode::new(move |state: GraphState| {
                let generator = generator.clone();
                async move { nodes::generate(&state, generator.as_ref()).await }
            }),
        )
        .add_node(
            HALLUCINATION_CHECKER,
            FnNode::new(move |state: GraphState| {
                let grader = hallucination_grader.clone();
                async move { nodes::check_hallucination(&state, grader.as_ref()).await }
            }),
        )
        .add_node(
            MARK_HALLUCINATION,
            FnNode::new(|state: GraphState| async move {
                Ok::<_, CragError>(nodes::mark_hallucination(&state))
            }),
        )
        .add_node(
            END_HALLUCINATION,
            FnNode::new(|state: GraphState| async move {
                Ok::<_, CragError>(nodes::end_hallucination(&state))
            }),
        )
        .add_node(
            END_NOT_RELEVANT,
            FnNode::new(|state: GraphState| async move {
                Ok::<_, CragError>(nodes::end_not_relevant(&state))
            }),
        )
        .add_edge(RETRIEVE, RELEVANCE_CHECKER)
        .add_conditional_edges(
            RELEVANCE_CHECKER,
            |s: &GraphState| edges::after_grading(s).as_str().to_string(),
            [
                (edges::Route::Generate.as_str(), GENERATE),
                (edges::Route::WebSearch.as_str(), WEBSEARCH),
                (edges::Route::NotRelevant.as_str(), END_NOT_RELEVANT),
            ],
        )
        .add_edge(WEBSEARCH, MARK_WEB_SEARCH_DONE)
        .add_edge(MARK_WEB_SEARCH_DONE, RELEVANCE_CHECKER)
        .add_edge(GENERATE, HALLUCINATION_CHECKER)
        .add_conditional_edges(
            HALLUCINATION_CHECKER,
            |s: &GraphState| edges::grade_generation(s).as_str().to_string(),
            [
                (edges::Route::Useful.as_str(), END),
                (edges::Route::NotSupported.as_str(), MARK_HALLUCINATION),
                (edges::Route::Hallucinated.as_str(), END_HALLUCINATION),
            ],
        )
        .add_edge(MARK_HALLUCINATION, GENERATE)
        .add_edge(END_HALLUCINATION, END)
        .add_edge(END_NOT_RELEVANT, END)
        .with_recursion_limit(options.recursion_limit);

    if options.route_questions {
        let router = router.ok_or_else(|| {
            CragError::Config("question routing enabled but no router was supplied".to_string())
        })?;
        graph = graph
            .add_node(
                ROUTE_QUESTION,
                FnNode::new(move |state: GraphState| {
                    let router = router.clone();
                    async move { nodes::route_question(&state, router.as_ref()).await }
                }),
            )
            .add_conditional_edges(
                ROUTE_QUESTION,
                |s: &GraphState| edges::route_question(s).as_str().to_string(),
                [
                    (edges::Route::WebSearch.as_str(), WEBSEARCH),
                    (edges::Route::Vectorstore.as_str(), RETRIEVE),
                ],
            )
            .set_entry_point(ROUTE_QUESTION);
    } else {
        graph = graph.set_entry_point(RETRIEVE);
    }

    graph.compile()
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Grounded,
    Hallucinated,
    NotRelevant,
}

/// The result of one question.
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub generation: String,
    pub outcome: Outcome,
    /// Node names in execution order.
    pub steps: Vec<String>,
    pub documents: Vec<Document>,
}

impl Answer {
    /// Summarize a finished run from its step names and final state.
    pub fn from_run(steps: Vec<String>, state: GraphState) -> Self {
        let outcome = match steps.last().map(String::as_str) {
            Some(END_HALLUCINATION) => Outcome::Hallucinated,
            Some(END_NOT_RELEVANT) => Outcome::NotRelevant,
            _ if state.grounded == Some(Grade::No) => Outcome::Hallucinated,
            _ => Outcome::Grounded,
        };
        Self {
            question: state.question().to_string(),
            generation: state
                .generation
                .clone()
                .unwrap_or_else(|| NO_ANSWER_MESSAGE.to_string()),
            outcome,
            steps,
            documents: state.documents.unwrap_or_default(),
        }
    }
}

/// Runs questions through a compiled RAG graph.
pub struct RagPipeline {
    graph: CompiledGraph<GraphState>,
}

impl RagPipeline {
    pub fn new(graph: CompiledGraph<GraphState>) -> Self {
        Self { graph }
    }

    pub fn from_components(components: RagComponents, options: WorkflowOptions) -> Result<Self, CragError> {
        Ok(Self::new(build_workflow(components, options)?))
    }

    /// Stream one event per finished step.
    pub fn stream(&self, question: &str) -> GraphStream<'_, GraphState> {
        self.graph.stream(GraphState::new(question))
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, CragError> {
        let mut events = self.stream(question);
        let mut steps = Vec::new();
        let mut last = GraphState::new(question);
        while let Some(event) = events.next().await {
            let event = event?;
            tracing::info!(node = %event.node, "finished running");
            steps.push(event.node);
            last = event.state;
        }
        Ok(Answer::from_run(steps, last))
    }

    pub fn draw_mermaid(&self) -> String {
        self.graph.draw_mermaid()
    }
}
