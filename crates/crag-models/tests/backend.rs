use crag_core::{ChatModel, ChatRequest, CragError, Message};
use crag_models::{
    FakeBackend, ProviderBackend, ProviderRequest, ProviderResponse, ScriptedChatModel,
};
use serde_json::json;

#[tokio::test]
async fn fake_backend_replays_in_order_and_records_requests() {
    let backend = FakeBackend::new();
    backend.push_json(json!({"n": 1})).push_json(json!({"n": 2}));

    let first = backend
        .send(ProviderRequest::new("http://x/a", json!({"q": "a"})).with_bearer("k"))
        .await
        .unwrap();
    let second = backend
        .send(ProviderRequest::new("http://x/b", json!({"q": "b"})))
        .await
        .unwrap();
    assert_eq!(first.body["n"], 1);
    assert_eq!(second.body["n"], 2);

    let exhausted = backend
        .send(ProviderRequest::new("http://x/c", json!({})))
        .await;
    assert!(exhausted.is_err());

    let requests = backend.requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].url, "http://x/a");
    assert_eq!(
        requests[0].headers,
        vec![("Authorization".to_string(), "Bearer k".to_string())]
    );
}

#[test]
fn error_for_status_keeps_success_and_wraps_failures() {
    let ok = ProviderResponse::ok(json!({})).error_for_status(CragError::Model);
    assert!(ok.is_ok());

    let err = ProviderResponse {
        status: 401,
        body: json!({"error": "bad key"}),
    }
    .error_for_status(CragError::WebSearch)
    .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("401"), "{text}");
    assert!(text.contains("bad key"), "{text}");
}

#[tokio::test]
async fn scripted_model_replays_then_exhausts() {
    let model = ScriptedChatModel::from_texts(["one", "two"]);
    let request = ChatRequest::new(vec![Message::human("hi")]);

    assert_eq!(model.chat(request.clone()).await.unwrap().content(), "one");
    assert_eq!(model.chat(request.clone()).await.unwrap().content(), "two");
    let err = model.chat(request).await.unwrap_err();
    assert!(err.to_string().contains("exhausted"));
    assert_eq!(model.requests().len(), 3);
    assert_eq!(model.remaining(), 0);
}
