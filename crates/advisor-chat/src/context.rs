//! Heuristic user-context extraction.
//!
//! Scans the latest exchange against fixed vocabularies and folds anything
//! it recognises into the session's `UserProfile`. Matching is plain
//! substring containment on lower-cased text, so "pores" inside a longer
//! word still counts.

use advisor_core::types::{SkinType, UserProfile};
use regex::Regex;
use tracing::debug;

/// Name patterns in priority order. The first pattern that matches wins.
const NAME_PATTERNS: [&str; 4] = [
    r"(?i)my name is ([A-Za-z0-9_]+)",
    r"(?i)i'm ([A-Za-z0-9_]+)",
    r"(?i)i am ([A-Za-z0-9_]+)",
    r"(?i)call me ([A-Za-z0-9_]+)",
];

/// Skin concerns looked for in the user's message.
pub const CONCERNS: [&str; 9] = [
    "acne",
    "wrinkles",
    "aging",
    "dark spots",
    "dryness",
    "oiliness",
    "pores",
    "redness",
    "sensitivity",
];

/// Product categories looked for in the assistant's reply.
pub const PRODUCT_KEYWORDS: [&str; 7] = [
    "moisturizer",
    "cleanser",
    "serum",
    "foundation",
    "mascara",
    "lipstick",
    "sunscreen",
];

/// Skin-type phrase pair: "<type> skin" and "skin is <type>".
struct SkinPattern {
    skin_type: SkinType,
    suffixed: String,
    prefixed: String,
}

/// Compiled extraction rules, built once per session and reused.
pub struct ContextExtractor {
    name_patterns: Vec<Regex>,
    skin_patterns: Vec<SkinPattern>,
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextExtractor {
    pub fn new() -> Self {
        let name_patterns = NAME_PATTERNS
            .iter()
            .map(|pat| Regex::new(pat).expect("Invalid name regex"))
            .collect();

        let skin_patterns = SkinType::ALL
            .iter()
            .map(|skin_type| SkinPattern {
                skin_type: *skin_type,
                suffixed: format!("{} skin", skin_type.as_str()),
                prefixed: format!("skin is {}", skin_type.as_str()),
            })
            .collect();

        Self {
            name_patterns,
            skin_patterns,
        }
    }

    /// Update `profile` from one completed exchange.
    pub fn update(&self, profile: &mut UserProfile, user_message: &str, ai_response: &str) {
        let lower_message = user_message.to_lowercase();

        if let Some(name) = self.extract_name(user_message) {
            debug!(name = %name, "User name detected");
            profile.name = Some(name);
        }

        for pattern in &self.skin_patterns {
            if lower_message.contains(&pattern.suffixed) || lower_message.contains(&pattern.prefixed)
            {
                if profile.skin_type != Some(pattern.skin_type) {
                    profile.skin_type = Some(pattern.skin_type);
                    debug!(skin_type = %pattern.skin_type, "Skin type detected");
                }
            }
        }

        for concern in CONCERNS {
            if lower_message.contains(concern) && profile.add_concern(concern) {
                debug!(concern, "New concern detected");
            }
        }

        let lower_response = ai_response.to_lowercase();
        for product in PRODUCT_KEYWORDS {
            if lower_response.contains(product) {
                profile.add_product(product);
            }
        }
    }

    fn extract_name(&self, text: &str) -> Option<String> {
        self.name_patterns.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
