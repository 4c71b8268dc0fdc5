//! Prompt text for the model-backed judgments.

use crag_retrieval::Document;

pub const ROUTER_SYSTEM: &str = "You are an expert at routing a user question to a vectorstore or web search.
Use the vectorstore for questions on LLM agents, prompt engineering, and adversarial attacks.
You do not need to be stringent with the keywords in the question related to these topics.
Otherwise, use web-search. Give a binary choice 'web_search' or 'vectorstore' based on the question.
Return a JSON object with a single key 'datasource' and no preamble or explanation.";

pub const RETRIEVAL_GRADER_SYSTEM: &str = "You are a grader assessing relevance of a retrieved document to a user question.
If the document contains keywords related to the user question, grade it as relevant.
It does not need to be a stringent test. The goal is to filter out erroneous retrievals.
Give a binary score 'yes' or 'no' to indicate whether the document is relevant to the question.
Provide the binary score as a JSON object with a single key 'score' and no preamble or explanation.";

pub const GENERATOR_SYSTEM: &str = "You are an assistant for question-answering tasks.
Use the following pieces of retrieved context to answer the question. If you don't know the answer, just say that you don't know.
Use three sentences maximum and keep the answer concise.";

pub const HALLUCINATION_GRADER_SYSTEM: &str = "You are a grader assessing whether an answer is grounded in / supported by a set of facts.
Give a binary 'yes' or 'no' score to indicate whether the answer is grounded in / supported by a set of facts.
Provide the binary score as a JSON object with a single key 'score' and no preamble or explanation.";

pub fn router_human(question: &str) -> String {
    format!("question: {question}")
}

pub fn retrieval_grader_human(question: &str, document: &str) -> String {
    format!("question: {question}\n\n document: {document} ")
}

pub fn generator_human(question: &str, context: &str) -> String {
    format!("question: {question}\n\n context: {context} ")
}

pub fn hallucination_grader_human(documents: &str, generation: &str) -> String {
    format!("documents: {documents}\n\n answer: {generation} ")
}

pub fn translator_system(language: &str) -> String {
    format!(
        "You are a professional translator. Translate the following text into {language} \
         accurately. Write the translation in natural {language}."
    )
}

/// Join document contents into one context block.
pub fn format_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
