use std::sync::Arc;

use colored::Colorize;
use crag_config::CragConfig;
use crag_core::CragError;
use crag_retrieval::VectorStoreRetriever;
use crag_workflow::{
    Answer, GraphState, LlmTranslator, Outcome, RagComponents, RagPipeline, Translator,
    WorkflowOptions,
};
use futures::StreamExt;

use crate::{index, providers};

#[derive(Debug, Clone, Copy, Default)]
pub struct AskOptions {
    pub translate: bool,
    pub route: bool,
    pub mermaid: bool,
}

/// `crag ask`: run one question through the pipeline, printing each step as
/// it finishes.
pub async fn run(config: &CragConfig, question: &str, options: AskOptions) -> Result<(), CragError> {
    let model = providers::judgment_model(config)?;
    let embeddings = providers::embeddings(config)?;
    let store = index::open_or_build(config, embeddings.as_ref()).await?;
    let retriever = VectorStoreRetriever::new(store, embeddings).with_k(config.rag.top_k);

    let components =
        RagComponents::from_model(model.clone(), Arc::new(retriever), providers::web_search(config)?);
    let pipeline = RagPipeline::from_components(
        components,
        WorkflowOptions {
            route_questions: options.route,
            recursion_limit: config.rag.recursion_limit,
        },
    )?;
    if options.mermaid {
        println!("{}", pipeline.draw_mermaid());
    }

    let mut events = pipeline.stream(question);
    let mut steps = Vec::new();
    let mut last = GraphState::new(question);
    while let Some(event) = events.next().await {
        let event = event?;
        println!("{} {}", "Finished running:".dimmed(), event.node.cyan());
        steps.push(event.node);
        last = event.state;
    }

    let answer = Answer::from_run(steps, last);
    println!();
    println!("{}", "Final answer:".green().bold());
    match answer.outcome {
        Outcome::Grounded => println!("{}", answer.generation),
        _ => println!("{}", answer.generation.yellow()),
    }

    if options.translate && answer.outcome == Outcome::Grounded {
        let translator = LlmTranslator::new(model).with_language(&config.rag.translate_to);
        let translated = translator.translate(&answer.generation).await?;
        println!();
        println!("{}", format!("Translation ({}):", translator.language()).green().bold());
        println!("{translated}");
    }
    Ok(())
}
