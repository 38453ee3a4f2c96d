//! In-memory conversation state for one session.

use advisor_core::types::{Message, UserProfile};
use uuid::Uuid;

/// Ordered, append-only message history plus the session's profile.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    id: Uuid,
    messages: Vec<Message>,
    profile: UserProfile,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            profile: UserProfile::new(),
        }
    }

    /// Identifier of the current session, regenerated on reset.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The trailing `max` messages, or all of them when `max` is 0.
    pub fn window(&self, max: usize) -> &[Message] {
        if max == 0 || max >= self.messages.len() {
            &self.messages
        } else {
            &self.messages[self.messages.len() - max..]
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut UserProfile {
        &mut self.profile
    }

    /// Drop all messages and start a fresh profile and session id.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.messages.clear();
        self.profile = UserProfile::new();
    }
}
