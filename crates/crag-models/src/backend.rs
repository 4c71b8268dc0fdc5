use std::{collections::VecDeque, pin::Pin, sync::Arc};

use async_trait::async_trait;
use crag_core::CragError;
use futures::Stream;
use serde_json::Value;
use tokio::sync::Mutex;

/// A JSON POST request to a provider endpoint.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl ProviderRequest {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }
}

#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: Value,
}

impl ProviderResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an error built by `make_err`.
    pub fn error_for_status(
        self,
        make_err: impl FnOnce(String) -> CragError,
    ) -> Result<Self, CragError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(make_err(format!("HTTP {}: {}", self.status, self.body)))
        }
    }
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<bytes::Bytes, CragError>> + Send>>;

/// Transport used by every provider client.
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, CragError>;
    async fn send_stream(&self, request: ProviderRequest) -> Result<ByteStream, CragError>;
}

/// Production backend using reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build(&self, request: &ProviderRequest) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        builder.json(&request.body)
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderBackend for HttpBackend {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, CragError> {
        tracing::debug!(url = %request.url, "provider request");
        let response = self
            .build(&request)
            .send()
            .await
            .map_err(|e| CragError::Model(format!("HTTP request failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| CragError::Model(format!("failed to read response body: {e}")))?;
        // Error bodies are not always JSON; keep them as a string value.
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(ProviderResponse { status, body })
    }

    async fn send_stream(&self, request: ProviderRequest) -> Result<ByteStream, CragError> {
        use futures::StreamExt;

        tracing::debug!(url = %request.url, "provider stream request");
        let response = self
            .build(&request)
            .send()
            .await
            .map_err(|e| CragError::Model(format!("HTTP stream request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CragError::Model(format!(
                "HTTP {}: {text}",
                status.as_u16()
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(|e| CragError::Model(format!("stream error: {e}"))));

        Ok(Box::pin(stream))
    }
}

/// Test backend with queued responses and stream chunks.
///
/// Every request it receives is recorded and can be inspected with
/// [`FakeBackend::requests`].
#[derive(Clone, Default)]
pub struct FakeBackend {
    responses: Arc<Mutex<VecDeque<Result<ProviderResponse, CragError>>>>,
    stream_chunks: Arc<Mutex<VecDeque<Vec<bytes::Bytes>>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: ProviderResponse) -> &Self {
        self.responses
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(Ok(response));
        self
    }

    pub fn push_json(&self, body: Value) -> &Self {
        self.push_response(ProviderResponse::ok(body))
    }

    pub fn push_error(&self, error: CragError) -> &Self {
        self.responses
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(Err(error));
        self
    }

    pub fn push_stream_chunks(&self, chunks: Vec<bytes::Bytes>) -> &Self {
        self.stream_chunks
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(chunks);
        self
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ProviderBackend for FakeBackend {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, CragError> {
        self.requests.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        responses
            .pop_front()
            .unwrap_or_else(|| Err(CragError::Model("FakeBackend exhausted".to_string())))
    }

    async fn send_stream(&self, request: ProviderRequest) -> Result<ByteStream, CragError> {
        self.requests.lock().await.push(request);
        let mut stream_chunks = self.stream_chunks.lock().await;
        let chunks = stream_chunks.pop_front().unwrap_or_default();

        let stream = futures::stream::iter(chunks.into_iter().map(Ok));
        Ok(Box::pin(stream))
    }
}
