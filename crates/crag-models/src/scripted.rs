use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use crag_core::{ChatModel, ChatRequest, ChatResponse, CragError};

/// A chat model that replays a fixed script of responses.
///
/// Each call pops the next response; once the script runs out every call
/// fails. Requests are recorded for later inspection.
pub struct ScriptedChatModel {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatModel {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Convenience constructor from plain reply texts.
    pub fn from_texts<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(texts.into_iter().map(ChatResponse::ai).collect())
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CragError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| CragError::Model("scripted model lock poisoned".to_string()))?;
        responses
            .pop_front()
            .ok_or_else(|| CragError::Model("ScriptedChatModel exhausted".to_string()))
    }
}
