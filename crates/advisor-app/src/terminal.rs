//! Terminal rendering surface.
//!
//! Prints bubbles as prefixed lines. Customer text is printed literally with
//! control characters escaped so it cannot drive the terminal. An optional
//! `HtmlRenderer` mirror records the same transcript for export.

use std::io::Write;

use advisor_chat::renderer::TYPING_TEXT;
use advisor_chat::{Bubble, BubbleBody, BubbleTag, HtmlRenderer, Renderer};

const USER_PREFIX: &str = "you     ";
const AI_PREFIX: &str = "advisor ";
const INPUT_PROMPT: &str = "> ";

/// Renderer that writes the conversation to a terminal-like sink.
pub struct TerminalRenderer<W: Write> {
    out: W,
    typing: bool,
    enabled: bool,
    mirror: Option<HtmlRenderer>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            typing: false,
            enabled: true,
            mirror: None,
        }
    }

    /// Also record the transcript as HTML.
    pub fn with_transcript(mut self) -> Self {
        self.mirror = Some(HtmlRenderer::new());
        self
    }

    pub fn transcript(&self) -> Option<&HtmlRenderer> {
        self.mirror.as_ref()
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn append(&mut self, bubble: Bubble) {
        let prefix = match bubble.tag {
            BubbleTag::User => USER_PREFIX,
            BubbleTag::Ai => AI_PREFIX,
        };
        let body = match &bubble.body {
            BubbleBody::Literal(text) => escape_controls(text),
            BubbleBody::Markup(markup) => markup.clone(),
        };
        let indent = format!("\n{}", " ".repeat(prefix.len()));
        self.write(&format!("{}{}\n", prefix, body.replace('\n', &indent)));

        if let Some(mirror) = self.mirror.as_mut() {
            mirror.append(bubble);
        }
    }

    fn show_typing(&mut self) {
        if !self.typing {
            self.typing = true;
            self.write(&format!("{}{}", AI_PREFIX, TYPING_TEXT));
        }
    }

    fn hide_typing(&mut self) {
        if self.typing {
            self.typing = false;
            // Return to column 0 and erase the placeholder line.
            self.write("\r\x1b[2K");
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn focus_input(&mut self) {
        if self.enabled {
            self.write(INPUT_PROMPT);
        }
    }

    fn clear(&mut self) {
        self.typing = false;
        // Clear screen and home the cursor.
        self.write("\x1b[2J\x1b[H");
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.clear();
        }
    }
}

/// Escape control characters other than newline and tab.
fn escape_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() && c != '\n' && c != '\t' {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}
