//! Maps a failed turn to the single message shown to the customer.

use crate::error::ChatError;

/// User-facing category of a failed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Credentials,
    RateLimited,
    Connectivity,
    Generic,
}

impl FailureKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::Credentials => {
                "There's an issue with the API key. Please check your configuration."
            }
            FailureKind::RateLimited => {
                "Too many requests. Please wait a moment before trying again."
            }
            FailureKind::Connectivity => {
                "Network connection issue. Please check your internet connection."
            }
            FailureKind::Generic => {
                "Sorry, I'm having trouble connecting right now. Please try again in a moment."
            }
        }
    }
}

/// Classifies failures by their rendered text, in fixed priority order.
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// "401" beats "429", which beats network failures; anything else is generic.
    pub fn classify(&self, error: &ChatError) -> FailureKind {
        let text = error.to_string();
        if text.contains("401") {
            FailureKind::Credentials
        } else if text.contains("429") {
            FailureKind::RateLimited
        } else if error.is_network() || text.contains("network") {
            FailureKind::Connectivity
        } else {
            FailureKind::Generic
        }
    }
}
