//! Rendering surface for the chat transcript.
//!
//! Defines the `Renderer` trait the turn driver talks to, and the `Bubble`
//! values it appends. Concrete surfaces live in submodules or in the app.

pub mod html;

pub use html::HtmlRenderer;

/// Text shown in the transient typing placeholder.
pub const TYPING_TEXT: &str = "Typing...";

/// Which side of the conversation a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleTag {
    User,
    Ai,
}

impl BubbleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BubbleTag::User => "user",
            BubbleTag::Ai => "ai",
        }
    }
}

/// Bubble content and how a surface may interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleBody {
    /// Customer-controlled text. Never interpreted as markup.
    Literal(String),
    /// Trusted assistant output that may carry formatting.
    Markup(String),
}

impl BubbleBody {
    pub fn text(&self) -> &str {
        match self {
            BubbleBody::Literal(s) | BubbleBody::Markup(s) => s,
        }
    }
}

/// One message bubble in the transcript container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub tag: BubbleTag,
    pub body: BubbleBody,
}

impl Bubble {
    /// A bubble for `text`: literal when the customer wrote it, markup otherwise.
    pub fn message(text: impl Into<String>, is_user: bool) -> Self {
        if is_user {
            Self::user(text)
        } else {
            Self::ai(text)
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            tag: BubbleTag::User,
            body: BubbleBody::Literal(text.into()),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            tag: BubbleTag::Ai,
            body: BubbleBody::Markup(text.into()),
        }
    }
}

/// A chat surface: a scrolling bubble container plus the input form.
pub trait Renderer {
    /// Append a bubble and scroll the container to the bottom.
    fn append(&mut self, bubble: Bubble);

    /// Show the typing placeholder.
    fn show_typing(&mut self);

    /// Remove the typing placeholder. No-op when it is not shown.
    fn hide_typing(&mut self);

    /// Enable or disable the input and submit controls.
    fn set_enabled(&mut self, enabled: bool);

    /// Return keyboard focus to the input.
    fn focus_input(&mut self);

    /// Remove every bubble from the container.
    fn clear(&mut self);
}
