//! In-memory HTML bubble container.
//!
//! Mirrors the browser widget's DOM: each bubble is a `div.msg` tagged
//! `user` or `ai`, the typing placeholder is a `div.msg.ai.typing-indicator`.
//! Literal bodies are escaped; markup bodies are inserted as-is.

use super::{Bubble, BubbleBody, Renderer, TYPING_TEXT};

/// Renderer that keeps the transcript as HTML fragments.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    children: Vec<String>,
    typing: bool,
    disabled: bool,
    focused: bool,
    scroll_top: usize,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bubble fragments in display order, excluding the typing placeholder.
    pub fn bubbles(&self) -> &[String] {
        &self.children
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Index of the child the container is scrolled to.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// The container's inner HTML, typing placeholder last when shown.
    pub fn inner_html(&self) -> String {
        let mut html = self.children.concat();
        if self.typing {
            html.push_str(&format!(
                "<div class=\"msg ai typing-indicator\">{}</div>",
                TYPING_TEXT
            ));
        }
        html
    }

    /// A standalone page holding the transcript.
    pub fn to_page(&self, title: &str) -> String {
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
.chat-window{{display:flex;flex-direction:column;gap:10px;font-family:sans-serif;max-width:640px;margin:20px auto}}
.msg{{padding:10px 14px;border-radius:12px;white-space:pre-wrap;max-width:80%}}
.msg.user{{align-self:flex-end;background:#000;color:#fff}}
.msg.ai{{align-self:flex-start;background:#f1f1f1}}
</style>
</head>
<body>
<div class="chat-window" id="chatWindow">{content}</div>
</body>
</html>
"##,
            title = html_escape(title),
            content = self.inner_html(),
        )
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.children.len() + usize::from(self.typing);
    }
}

impl Renderer for HtmlRenderer {
    fn append(&mut self, bubble: Bubble) {
        let content = match &bubble.body {
            BubbleBody::Literal(text) => html_escape(text),
            BubbleBody::Markup(markup) => markup.clone(),
        };
        self.children.push(format!(
            "<div class=\"msg {}\">{}</div>",
            bubble.tag.as_str(),
            content
        ));
        self.scroll_to_bottom();
    }

    fn show_typing(&mut self) {
        self.typing = true;
        self.scroll_to_bottom();
    }

    fn hide_typing(&mut self) {
        self.typing = false;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
        if !enabled {
            self.focused = false;
        }
    }

    fn focus_input(&mut self) {
        self.focused = true;
    }

    fn clear(&mut self) {
        self.children.clear();
        self.typing = false;
        self.scroll_top = 0;
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
