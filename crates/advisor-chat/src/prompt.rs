//! System prompt composition.

use advisor_core::types::{Message, UserProfile};

/// Fixed persona and off-topic policy sent at the head of every request.
pub const BASE_SYSTEM_PROMPT: &str = "You are a helpful L'Oréal beauty advisor. Your role is specifically to help customers with L'Oréal products, skincare routines, makeup tips, beauty advice, and cosmetic recommendations. You should be friendly, knowledgeable, and professional. Keep responses concise but helpful. IMPORTANT: If users ask about topics unrelated to beauty, cosmetics, skincare, makeup, or L'Oréal products (such as general knowledge, politics, technology, sports, etc.), politely redirect them back to beauty-related topics. For example, you can say 'I'm here to help you with L'Oréal products and beauty advice. Is there anything about skincare, makeup, or our product range I can assist you with today?'";

const CONTEXT_INSTRUCTION: &str = "Use this context to provide personalized recommendations and reference previous parts of the conversation naturally.";

/// Builds the system message from the current profile.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Compose the system message. Pure and deterministic.
    pub fn build(&self, profile: &UserProfile) -> Message {
        let context = Self::context_clause(profile);
        if context.is_empty() {
            Message::system(BASE_SYSTEM_PROMPT)
        } else {
            Message::system(format!(
                "{} CONTEXT: {}{}",
                BASE_SYSTEM_PROMPT, context, CONTEXT_INSTRUCTION
            ))
        }
    }

    /// Populated profile fields in fixed order, each ending in ". ".
    fn context_clause(profile: &UserProfile) -> String {
        let mut info = String::new();

        if let Some(ref name) = profile.name {
            info.push_str(&format!("The user's name is {}. ", name));
        }
        if let Some(skin_type) = profile.skin_type {
            info.push_str(&format!("They have {} skin. ", skin_type));
        }
        if !profile.concerns.is_empty() {
            info.push_str(&format!(
                "Their skin concerns include: {}. ",
                profile.concerns.join(", ")
            ));
        }
        if !profile.previous_products.is_empty() {
            info.push_str(&format!(
                "You've previously discussed these product types: {}. ",
                profile.previous_products.join(", ")
            ));
        }

        info
    }
}
