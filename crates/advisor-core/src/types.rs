use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Author of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Persona and context instructions, always first in a request.
    System,
    /// Text typed by the customer.
    User,
    /// Reply produced by the provider.
    Assistant,
}

/// Skin type recognised by the context extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Sensitive,
    Normal,
    Mature,
}

impl SkinType {
    /// All skin types in matching order.
    pub const ALL: [SkinType; 6] = [
        SkinType::Dry,
        SkinType::Oily,
        SkinType::Combination,
        SkinType::Sensitive,
        SkinType::Normal,
        SkinType::Mature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Dry => "dry",
            SkinType::Oily => "oily",
            SkinType::Combination => "combination",
            SkinType::Sensitive => "sensitive",
            SkinType::Normal => "normal",
            SkinType::Mature => "mature",
        }
    }
}

impl std::fmt::Display for SkinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Message
// =============================================================================

/// A single role-tagged entry of the conversation, in wire format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// UserProfile
// =============================================================================

/// Heuristic context gathered about the customer during one session.
///
/// Fields are only ever added or overwritten; nothing is removed until the
/// whole profile is replaced on reset. `concerns` and `previous_products`
/// keep insertion order and never hold duplicates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub skin_type: Option<SkinType>,
    pub concerns: Vec<String>,
    pub previous_products: Vec<String>,
    pub session_start: DateTime<Local>,
}

impl UserProfile {
    /// A profile with only the session start populated.
    pub fn new() -> Self {
        Self {
            name: None,
            skin_type: None,
            concerns: Vec::new(),
            previous_products: Vec::new(),
            session_start: Local::now(),
        }
    }

    /// Whether any context field besides `session_start` is populated.
    pub fn has_context(&self) -> bool {
        self.name.is_some()
            || self.skin_type.is_some()
            || !self.concerns.is_empty()
            || !self.previous_products.is_empty()
    }

    /// Record a concern. Returns `false` if it was already present.
    pub fn add_concern(&mut self, concern: &str) -> bool {
        push_unique(&mut self.concerns, concern)
    }

    /// Record a product category. Returns `false` if it was already present.
    pub fn add_product(&mut self, product: &str) -> bool {
        push_unique(&mut self.previous_products, product)
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new()
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

// =============================================================================
// Tests
// =============================================================================
