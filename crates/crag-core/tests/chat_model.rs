use async_trait::async_trait;
use crag_core::{ChatModel, ChatRequest, ChatResponse, CragError, Message, ResponseFormat, Role};

struct Echo;

#[async_trait]
impl ChatModel for Echo {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CragError> {
        let last = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(ChatResponse::ai(last))
    }
}

#[tokio::test]
async fn models_are_usable_as_trait_objects() {
    let model: Box<dyn ChatModel> = Box::new(Echo);
    let response = model
        .chat(ChatRequest::new(vec![Message::system("s"), Message::human("hello")]))
        .await
        .unwrap();
    assert_eq!(response.content(), "hello");
    assert!(response.message.is_ai());
}

#[test]
fn request_builder_and_roles() {
    let request = ChatRequest::new(vec![Message::system("s"), Message::human("h")])
        .with_temperature(0.0)
        .with_format(ResponseFormat::Json);
    assert_eq!(request.temperature, Some(0.0));
    assert_eq!(request.format, ResponseFormat::Json);
    assert_eq!(request.messages[0].role.as_str(), "system");
    assert_eq!(request.messages[1].role.as_str(), "user");
    assert_eq!(Role::Ai.as_str(), "assistant");
    assert!(Message::ai("x").is_ai());
    assert!(Message::human("x").is_human());
}

#[test]
fn roles_serialize_with_wire_names() {
    let json = serde_json::to_value(Message::human("hi")).unwrap();
    assert_eq!(json["role"], "user");
    let json = serde_json::to_value(Message::ai("hi")).unwrap();
    assert_eq!(json["role"], "assistant");
}
