use std::sync::Arc;

use crag_core::{ChatModel, ChatRequest, Embeddings, Message, ResponseFormat};
use crag_models::{FakeBackend, ProviderResponse};
use crag_openai::{OpenAiChatModel, OpenAiConfig, OpenAiEmbeddings};
use serde_json::json;

#[tokio::test]
async fn chat_completion_request_shape() {
    let backend = FakeBackend::new();
    backend.push_json(json!({
        "choices": [{"message": {"role": "assistant", "content": "{\"datasource\":\"vectorstore\"}"}}]
    }));
    let model = OpenAiChatModel::new(OpenAiConfig::new("sk-test", "gpt-4o-mini").with_temperature(0.0))
        .with_backend(Arc::new(backend.clone()));

    let response = model
        .chat(
            ChatRequest::new(vec![Message::system("route"), Message::human("question: x")])
                .with_format(ResponseFormat::Json),
        )
        .await
        .unwrap();
    assert_eq!(response.content(), "{\"datasource\":\"vectorstore\"}");

    let request = &backend.requests().await[0];
    assert_eq!(request.url, "https://api.openai.com/v1/chat/completions");
    assert!(request
        .headers
        .contains(&("Authorization".to_string(), "Bearer sk-test".to_string())));
    assert_eq!(request.body["model"], "gpt-4o-mini");
    assert_eq!(request.body["temperature"], 0.0);
    assert_eq!(request.body["response_format"]["type"], "json_object");
    assert_eq!(request.body["messages"][1]["role"], "user");
}

#[tokio::test]
async fn chat_error_status_is_a_model_error() {
    let backend = FakeBackend::new();
    backend.push_response(ProviderResponse {
        status: 429,
        body: json!({"error": {"message": "rate limited"}}),
    });
    let model = OpenAiChatModel::new(OpenAiConfig::new("k", "m")).with_backend(Arc::new(backend));
    let err = model
        .chat(ChatRequest::new(vec![Message::human("hi")]))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("model error"));
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn chat_without_choices_is_a_parsing_error() {
    let backend = FakeBackend::new();
    backend.push_json(json!({"choices": []}));
    let model = OpenAiChatModel::new(OpenAiConfig::new("k", "m")).with_backend(Arc::new(backend));
    let err = model
        .chat(ChatRequest::new(vec![Message::human("hi")]))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("parsing error"));
}

#[tokio::test]
async fn embeddings_are_reordered_by_index() {
    let backend = FakeBackend::new();
    backend.push_json(json!({
        "data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]
    }));
    let embeddings = OpenAiEmbeddings::new(OpenAiConfig::new("k", "text-embedding-3-small"))
        .with_backend(Arc::new(backend.clone()));
    let vectors = embeddings.embed_documents(&["first", "second"]).await.unwrap();
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

    let request = &backend.requests().await[0];
    assert_eq!(request.url, "https://api.openai.com/v1/embeddings");
    assert_eq!(request.body["model"], "text-embedding-3-small");
}
