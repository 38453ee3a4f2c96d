//! Error types for the chat turn.

use advisor_core::error::AdvisorError;

use crate::turn::TurnState;

/// Errors from a chat turn or the session around it.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The provider answered with a non-2xx status.
    #[error("API Error: {status_code} - {provider_message}")]
    Api {
        status_code: u16,
        provider_message: String,
    },
    /// A 2xx response whose body lacks `choices[0].message.content`.
    #[error("Invalid response structure from API: {0}")]
    MalformedResponse(String),
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    #[error("a turn is already in flight")]
    TurnInFlight,
    #[error("invalid turn transition from {0} to {1}")]
    InvalidTransition(TurnState, TurnState),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// Whether the failure happened before any response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, ChatError::Network(_))
    }
}

impl From<AdvisorError> for ChatError {
    fn from(err: AdvisorError) -> Self {
        ChatError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL can contain digits that read like status codes.
        ChatError::Network(err.without_url().to_string())
    }
}
