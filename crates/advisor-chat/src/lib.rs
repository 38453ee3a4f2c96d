//! Conversational core of the beauty advisor.
//!
//! Provides context extraction, system prompt composition, the in-memory
//! conversation store, the HTTP chat transport, error classification, the
//! rendering abstraction, and the widget that drives one turn at a time.

pub mod classifier;
pub mod context;
pub mod error;
pub mod prompt;
pub mod renderer;
pub mod store;
pub mod transport;
pub mod turn;
pub mod widget;

pub use classifier::{ErrorClassifier, FailureKind};
pub use context::ContextExtractor;
pub use error::ChatError;
pub use prompt::{PromptBuilder, BASE_SYSTEM_PROMPT};
pub use renderer::{Bubble, BubbleBody, BubbleTag, HtmlRenderer, Renderer};
pub use store::ConversationStore;
pub use transport::{ChatTransport, Completion, HttpTransport, MockTransport};
pub use turn::TurnState;
pub use widget::{ChatWidget, ContextSummary, TurnOutcome, TRUNCATION_NOTICE};
