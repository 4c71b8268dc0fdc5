use std::sync::Arc;

use crag_core::{CragError, ResponseFormat, Role};
use crag_models::ScriptedChatModel;
use crag_retrieval::Document;
use crag_workflow::judgments::parse_json_label;
use crag_workflow::{
    AnswerGenerator, DataSource, Grade, HallucinationGrader, LlmAnswerGenerator,
    LlmHallucinationGrader, LlmQuestionRouter, LlmRetrievalGrader, LlmTranslator, QuestionRouter,
    RetrievalGrader, Translator,
};

#[test]
fn grade_labels() {
    assert_eq!(Grade::from_label("yes"), Grade::Yes);
    assert_eq!(Grade::from_label(" YES "), Grade::Yes);
    assert_eq!(Grade::from_label("no"), Grade::No);
    assert_eq!(Grade::from_label("maybe"), Grade::No);
    assert_eq!(Grade::from_label(""), Grade::No);
}

#[test]
fn datasource_labels() {
    assert_eq!(DataSource::from_label("web_search").unwrap(), DataSource::WebSearch);
    assert_eq!(DataSource::from_label("websearch").unwrap(), DataSource::WebSearch);
    assert_eq!(DataSource::from_label("Vectorstore").unwrap(), DataSource::Vectorstore);
    let err = DataSource::from_label("database").unwrap_err();
    assert!(matches!(err, CragError::Judgment(ref m) if m.contains("database")));
}

#[test]
fn json_label_parsing() {
    assert_eq!(parse_json_label(r#"{"score": "yes"}"#, "score").unwrap(), "yes");
    assert_eq!(
        parse_json_label("```json\n{\"datasource\": \"vectorstore\"}\n```", "datasource").unwrap(),
        "vectorstore"
    );
    assert_eq!(parse_json_label("```{\"score\":\"no\"}```", "score").unwrap(), "no");
}

#[test]
fn json_label_failures_are_parsing_errors() {
    for (output, key) in [
        ("yes", "score"),
        ("[\"yes\"]", "score"),
        (r#"{"grade": "yes"}"#, "score"),
        (r#"{"score": true}"#, "score"),
    ] {
        let err = parse_json_label(output, key).unwrap_err();
        assert!(matches!(err, CragError::Parsing(_)), "{output}: {err}");
    }
}

#[tokio::test]
async fn retrieval_grader_sends_json_request() {
    let model = Arc::new(ScriptedChatModel::from_texts([r#"{"score": "yes"}"#]));
    let grader = LlmRetrievalGrader::new(model.clone());

    let grade = grader
        .grade("agent memory", &Document::new("1", "Agents keep memory"))
        .await
        .unwrap();
    assert_eq!(grade, Grade::Yes);

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].format, ResponseFormat::Json);
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(
        requests[0].messages[1].content,
        "question: agent memory\n\n document: Agents keep memory "
    );
}

#[tokio::test]
async fn retrieval_grader_malformed_reply_fails() {
    let model = Arc::new(ScriptedChatModel::from_texts(["relevant!"]));
    let grader = LlmRetrievalGrader::new(model);
    let err = grader.grade("q", &Document::new("1", "d")).await.unwrap_err();
    assert!(matches!(err, CragError::Parsing(_)));
}

#[tokio::test]
async fn router_maps_labels() {
    let model = Arc::new(ScriptedChatModel::from_texts([
        r#"{"datasource": "web_search"}"#,
        r#"{"datasource": "vectorstore"}"#,
        r#"{"datasource": "library"}"#,
    ]));
    let router = LlmQuestionRouter::new(model);

    assert_eq!(router.route("weather today").await.unwrap(), DataSource::WebSearch);
    assert_eq!(router.route("agent memory").await.unwrap(), DataSource::Vectorstore);
    assert!(matches!(router.route("?").await.unwrap_err(), CragError::Judgment(_)));
}

#[tokio::test]
async fn generator_passes_context_as_text() {
    let model = Arc::new(ScriptedChatModel::from_texts(["Agents plan."]));
    let generator = LlmAnswerGenerator::new(model.clone());

    let answer = generator
        .generate("q", &[Document::new("1", "first"), Document::new("2", "second")])
        .await
        .unwrap();
    assert_eq!(answer, "Agents plan.");

    let request = &model.requests()[0];
    assert_eq!(request.format, ResponseFormat::Text);
    assert_eq!(request.messages[1].content, "question: q\n\n context: first\n\nsecond ");
}

#[tokio::test]
async fn hallucination_grader_reads_score() {
    let model = Arc::new(ScriptedChatModel::from_texts([r#"{"score": "no"}"#]));
    let grader = LlmHallucinationGrader::new(model.clone());

    let grade = grader.grade(&[Document::new("1", "fact")], "claim").await.unwrap();
    assert_eq!(grade, Grade::No);
    assert_eq!(
        model.requests()[0].messages[1].content,
        "documents: fact\n\n answer: claim "
    );
}

#[tokio::test]
async fn model_errors_propagate() {
    let model = Arc::new(ScriptedChatModel::new(vec![]));
    let grader = LlmHallucinationGrader::new(model);
    let err = grader.grade(&[], "x").await.unwrap_err();
    assert!(err.to_string().contains("exhausted"));
}

#[tokio::test]
async fn translator_targets_configured_language() {
    let model = Arc::new(ScriptedChatModel::from_texts(["에이전트는 계획한다."]));
    let translator = LlmTranslator::new(model.clone());
    assert_eq!(translator.language(), "Korean");

    let text = translator.translate("Agents plan.").await.unwrap();
    assert_eq!(text, "에이전트는 계획한다.");
    let request = &model.requests()[0];
    assert!(request.messages[0].content.contains("Korean"));
    assert_eq!(request.messages[1].content, "Agents plan.");

    let japanese = LlmTranslator::new(model).with_language("Japanese");
    assert_eq!(japanese.language(), "Japanese");
}
