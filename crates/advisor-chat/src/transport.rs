//! Chat transport: one JSON POST per turn to the completion proxy.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use advisor_core::config::EndpointConfig;
use advisor_core::types::Message;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::ChatError;

/// Provider message used when an error body carries none.
const UNKNOWN_ERROR: &str = "Unknown error";

/// A validated provider reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    /// The provider stopped because it hit its length limit.
    pub truncated: bool,
}

/// Sends a full message list and returns the provider's reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, messages: &[Message]) -> Result<Completion, ChatError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
}

/// `ChatTransport` over HTTP using reqwest.
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport for `url`. `None` disables the request timeout.
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, ChatError> {
        let timeout = (config.request_timeout_secs > 0)
            .then(|| Duration::from_secs(config.request_timeout_secs));
        Self::new(&config.url, timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, messages: &[Message]) -> Result<Completion, ChatError> {
        tracing::debug!(url = %self.url, messages = messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status_code: status.as_u16(),
                provider_message: provider_error_message(&body),
            });
        }

        let body = response.text().await?;
        parse_completion(&body)
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Scripted transport for testing.
///
/// Replies are returned in the order they were queued; every request is
/// recorded. An exhausted script answers with a network error.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<Completion, ChatError>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, content: &str, truncated: bool) -> Self {
        self.push(Ok(Completion {
            content: content.to_string(),
            truncated,
        }))
    }

    /// Queue a failure.
    pub fn fail(self, error: ChatError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<Completion, ChatError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Every message list sent so far.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, messages: &[Message]) -> Result<Completion, ChatError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Err(ChatError::Network("mock transport has no reply".into())))
    }
}

/// Best-effort `error.message` from an error body.
pub fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Validate a 2xx body and pull out `choices[0]`.
pub fn parse_completion(body: &str) -> Result<Completion, ChatError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ChatError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    let choice = value
        .pointer("/choices/0")
        .ok_or_else(|| ChatError::MalformedResponse("missing choices[0]".to_string()))?;

    let content = choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ChatError::MalformedResponse("missing choices[0].message.content".to_string())
        })?;

    let truncated = choice.get("finish_reason").and_then(Value::as_str) == Some("length");

    Ok(Completion {
        content: content.to_string(),
        truncated,
    })
}
