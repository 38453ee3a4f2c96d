//! Chat widget: drives one turn at a time through the transport and renderer.
//!
//! A turn renders the customer's bubble, records the message, sends the
//! system prompt plus history, and then either folds the reply into the
//! profile and transcript or shows exactly one failure message. Controls are
//! disabled only while the request is outstanding.

use advisor_core::config::ChatConfig;
use advisor_core::types::{Message, UserProfile};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::classifier::{ErrorClassifier, FailureKind};
use crate::context::ContextExtractor;
use crate::error::ChatError;
use crate::prompt::PromptBuilder;
use crate::renderer::{Bubble, Renderer};
use crate::store::ConversationStore;
use crate::transport::{ChatTransport, Completion};
use crate::turn::{validate_transition, TurnState};

/// Appended to the displayed reply when the provider hit its length limit.
pub const TRUNCATION_NOTICE: &str =
    "\n\n[Response was truncated. Please ask me to continue if you need more information.]";

/// How a submission ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// The provider answered. `content` is the reply without any notice.
    Answered { content: String, truncated: bool },
    /// The turn failed and `kind.user_message()` was shown.
    Failed { kind: FailureKind, error: ChatError },
}

/// Snapshot of the session context for inspection.
#[derive(Debug, Clone)]
pub struct ContextSummary {
    pub session_id: Uuid,
    pub profile: UserProfile,
    pub message_count: usize,
}

/// A chat session bound to one transport and one rendering surface.
pub struct ChatWidget<T, R> {
    transport: T,
    renderer: R,
    store: ConversationStore,
    extractor: ContextExtractor,
    prompt: PromptBuilder,
    classifier: ErrorClassifier,
    state: TurnState,
    config: ChatConfig,
}

impl<T: ChatTransport, R: Renderer> ChatWidget<T, R> {
    /// Create a widget and render the greeting.
    pub fn new(transport: T, renderer: R, config: ChatConfig) -> Self {
        let mut widget = Self {
            transport,
            renderer,
            store: ConversationStore::new(),
            extractor: ContextExtractor::new(),
            prompt: PromptBuilder,
            classifier: ErrorClassifier,
            state: TurnState::Idle,
            config,
        };
        widget.greet();
        info!(session = %widget.store.id(), "Chat session started");
        widget
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one turn for `input`.
    ///
    /// Transport failures are rendered and reported as
    /// `TurnOutcome::Failed`; `Err` is returned only when a turn is already
    /// in flight.
    pub async fn submit(&mut self, input: &str) -> Result<TurnOutcome, ChatError> {
        let message = input.trim();
        if message.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        if self.state == TurnState::Sending {
            return Err(ChatError::TurnInFlight);
        }

        self.transition(TurnState::Sending)?;
        self.renderer.set_enabled(false);
        self.renderer.append(Bubble::user(message));
        self.store.append(Message::user(message));

        let system = self.prompt.build(self.store.profile());
        let history = self.store.window(self.config.max_history);
        let mut request = Vec::with_capacity(history.len() + 1);
        request.push(system);
        request.extend_from_slice(history);

        self.renderer.show_typing();
        debug!(
            session = %self.store.id(),
            messages = request.len(),
            "Turn sending"
        );
        let result = self.transport.send(&request).await;
        self.renderer.hide_typing();

        let outcome = match result {
            Ok(completion) => {
                self.transition(TurnState::Succeeded)?;
                self.complete(message, completion)
            }
            Err(err) => {
                self.transition(TurnState::Failed)?;
                self.fail(err)
            }
        };

        self.renderer.set_enabled(true);
        self.renderer.focus_input();
        self.transition(TurnState::Idle)?;
        Ok(outcome)
    }

    /// Clear the conversation and profile and re-render the greeting.
    ///
    /// Rejected while a turn is in flight.
    pub fn reset(&mut self) -> Result<(), ChatError> {
        if self.state == TurnState::Sending {
            return Err(ChatError::TurnInFlight);
        }
        self.store.reset();
        self.renderer.clear();
        self.greet();
        info!(session = %self.store.id(), "Conversation reset");
        Ok(())
    }

    /// Current profile and conversation length, also written to the log.
    pub fn context_summary(&self) -> ContextSummary {
        let summary = ContextSummary {
            session_id: self.store.id(),
            profile: self.store.profile().clone(),
            message_count: self.store.len(),
        };
        info!(
            session = %summary.session_id,
            profile = ?summary.profile,
            message_count = summary.message_count,
            "Current user context"
        );
        summary
    }

    fn complete(&mut self, message: &str, completion: Completion) -> TurnOutcome {
        let Completion { content, truncated } = completion;

        self.extractor
            .update(self.store.profile_mut(), message, &content);

        if truncated {
            warn!(session = %self.store.id(), "Response was truncated due to token limit");
            self.renderer
                .append(Bubble::ai(format!("{}{}", content, TRUNCATION_NOTICE)));
        } else {
            self.renderer.append(Bubble::ai(content.clone()));
        }

        self.store.append(Message::assistant(content.clone()));
        TurnOutcome::Answered { content, truncated }
    }

    fn fail(&mut self, err: ChatError) -> TurnOutcome {
        let kind = self.classifier.classify(&err);
        self.renderer.append(Bubble::ai(kind.user_message()));
        error!(session = %self.store.id(), error = %err, kind = ?kind, "Detailed error");
        TurnOutcome::Failed { kind, error: err }
    }

    fn greet(&mut self) {
        if !self.config.greeting.is_empty() {
            self.renderer.append(Bubble::ai(self.config.greeting.clone()));
        }
    }

    fn transition(&mut self, to: TurnState) -> Result<(), ChatError> {
        validate_transition(self.state, to)?;
        self.state = to;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HtmlRenderer;
    use crate::transport::MockTransport;
    use advisor_core::config::DEFAULT_GREETING;
    use advisor_core::types::{Role, SkinType};

    /// Records renderer calls in order.
    #[derive(Debug, Default)]
    struct RecordingRenderer {
        events: Vec<String>,
    }

    impl Renderer for RecordingRenderer {
        fn append(&mut self, bubble: Bubble) {
            self.events
                .push(format!("append:{}:{}", bubble.tag.as_str(), bubble.body.text()));
        }
        fn show_typing(&mut self) {
            self.events.push("show_typing".into());
        }
        fn hide_typing(&mut self) {
            self.events.push("hide_typing".into());
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.events.push(format!("enabled:{}", enabled));
        }
        fn focus_input(&mut self) {
            self.events.push("focus".into());
        }
        fn clear(&mut self) {
            self.events.push("clear".into());
        }
    }

    fn widget(transport: MockTransport) -> ChatWidget<MockTransport, HtmlRenderer> {
        ChatWidget::new(transport, HtmlRenderer::new(), ChatConfig::default())
    }

    fn api(status_code: u16) -> ChatError {
        ChatError::Api {
            status_code,
            provider_message: "Unknown error".into(),
        }
    }

    // ---- Construction ----

    #[test]
    fn test_new_renders_greeting() {
        let w = widget(MockTransport::new());
        assert_eq!(w.renderer().bubbles().len(), 1);
        assert!(w.renderer().bubbles()[0].contains(DEFAULT_GREETING));
        assert!(w.store().is_empty());
        assert_eq!(w.state(), TurnState::Idle);
    }

    #[test]
    fn test_empty_greeting_renders_nothing() {
        let config = ChatConfig {
            greeting: String::new(),
            ..ChatConfig::default()
        };
        let w = ChatWidget::new(MockTransport::new(), HtmlRenderer::new(), config);
        assert!(w.renderer().bubbles().is_empty());
    }

    // ---- Success ----

    #[tokio::test]
    async fn test_successful_turn() {
        let mut w = widget(MockTransport::new().reply("Hello Alex!", false));
        let outcome = w.submit("  my name is Alex  ").await.unwrap();

        match outcome {
            TurnOutcome::Answered { content, truncated } => {
                assert_eq!(content, "Hello Alex!");
                assert!(!truncated);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let msgs = w.store().messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0], Message::user("my name is Alex"));
        assert_eq!(msgs[1], Message::assistant("Hello Alex!"));
        assert_eq!(w.store().profile().name.as_deref(), Some("Alex"));

        let bubbles = w.renderer().bubbles();
        assert_eq!(bubbles.len(), 3);
        assert_eq!(bubbles[1], "<div class=\"msg user\">my name is Alex</div>");
        assert_eq!(bubbles[2], "<div class=\"msg ai\">Hello Alex!</div>");
        assert!(!w.renderer().is_typing());
        assert!(w.renderer().is_enabled());
        assert!(w.renderer().is_focused());
        assert_eq!(w.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn test_request_is_system_then_history() {
        let mut w = widget(
            MockTransport::new()
                .reply("Nice to meet you", false)
                .reply("Try a cleanser", false),
        );
        w.submit("I have oily skin").await.unwrap();
        w.submit("what should I use?").await.unwrap();

        let requests = w.transport().requests();
        assert_eq!(requests.len(), 2);

        // First request: profile still empty when the prompt was built.
        let first = &requests[0];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].role, Role::System);
        assert!(!first[0].content.contains("CONTEXT:"));
        assert_eq!(first[1], Message::user("I have oily skin"));

        // Second request carries the extracted context and full history.
        let second = &requests[1];
        assert_eq!(second.len(), 4);
        assert!(second[0].content.contains("They have oily skin."));
        assert_eq!(second[1], Message::user("I have oily skin"));
        assert_eq!(second[2], Message::assistant("Nice to meet you"));
        assert_eq!(second[3], Message::user("what should I use?"));
    }

    #[tokio::test]
    async fn test_max_history_limits_request_not_store() {
        let config = ChatConfig {
            max_history: 1,
            ..ChatConfig::default()
        };
        let transport = MockTransport::new().reply("a", false).reply("b", false);
        let mut w = ChatWidget::new(transport, HtmlRenderer::new(), config);
        w.submit("one").await.unwrap();
        w.submit("two").await.unwrap();

        let requests = w.transport().requests();
        assert_eq!(requests[1].len(), 2);
        assert_eq!(requests[1][1], Message::user("two"));
        assert_eq!(w.store().len(), 4);
    }

    #[tokio::test]
    async fn test_truncated_reply_shows_notice_but_stores_raw() {
        let mut w = widget(MockTransport::new().reply("Step 1: cleanse", true));
        w.submit("routine?").await.unwrap();

        let last = w.renderer().bubbles().last().unwrap().clone();
        assert_eq!(
            last,
            format!("<div class=\"msg ai\">Step 1: cleanse{}</div>", TRUNCATION_NOTICE)
        );
        assert_eq!(
            w.store().messages().last().unwrap(),
            &Message::assistant("Step 1: cleanse")
        );
    }

    #[tokio::test]
    async fn test_untruncated_reply_is_exact() {
        let mut w = widget(MockTransport::new().reply("Use <em>SPF</em> daily", false));
        w.submit("sun?").await.unwrap();
        assert_eq!(
            w.renderer().bubbles().last().unwrap(),
            "<div class=\"msg ai\">Use <em>SPF</em> daily</div>"
        );
    }

    #[tokio::test]
    async fn test_products_tracked_from_reply() {
        let mut w = widget(
            MockTransport::new()
                .reply("I recommend a gentle cleanser and a daily moisturizer", false),
        );
        w.submit("help").await.unwrap();
        let products = &w.store().profile().previous_products;
        assert!(products.contains(&"cleanser".to_string()));
        assert!(products.contains(&"moisturizer".to_string()));
    }

    #[tokio::test]
    async fn test_user_markup_is_not_interpreted() {
        let mut w = widget(MockTransport::new().reply("ok", false));
        w.submit("<img src=x onerror=alert(1)>").await.unwrap();
        assert_eq!(
            w.renderer().bubbles()[1],
            "<div class=\"msg user\">&lt;img src=x onerror=alert(1)&gt;</div>"
        );
    }

    // ---- Failures ----

    async fn failed_message(error: ChatError) -> (FailureKind, String) {
        let mut w = widget(MockTransport::new().fail(error));
        let outcome = w.submit("hello").await.unwrap();
        let kind = match outcome {
            TurnOutcome::Failed { kind, .. } => kind,
            other => panic!("expected failure, got {:?}", other),
        };
        (kind, w.renderer().bubbles().last().unwrap().clone())
    }

    #[tokio::test]
    async fn test_401_shows_credentials_message() {
        let (kind, bubble) = failed_message(api(401)).await;
        assert_eq!(kind, FailureKind::Credentials);
        assert_eq!(
            bubble,
            "<div class=\"msg ai\">There's an issue with the API key. Please check your configuration.</div>"
        );
    }

    #[tokio::test]
    async fn test_429_shows_rate_limit_message() {
        let (kind, bubble) = failed_message(api(429)).await;
        assert_eq!(kind, FailureKind::RateLimited);
        assert!(bubble.contains(FailureKind::RateLimited.user_message()));
    }

    #[tokio::test]
    async fn test_network_shows_connectivity_message() {
        let (kind, bubble) = failed_message(ChatError::Network("dns".into())).await;
        assert_eq!(kind, FailureKind::Connectivity);
        assert!(bubble.contains(FailureKind::Connectivity.user_message()));
    }

    #[tokio::test]
    async fn test_other_failure_shows_generic_message() {
        let (kind, bubble) =
            failed_message(ChatError::MalformedResponse("missing choices[0]".into())).await;
        assert_eq!(kind, FailureKind::Generic);
        assert!(bubble.contains(FailureKind::Generic.user_message()));
    }

    #[tokio::test]
    async fn test_failure_leaves_profile_and_assistant_history_untouched() {
        let mut w = widget(MockTransport::new().fail(api(500)));
        w.submit("my name is Alex and I have acne").await.unwrap();

        // The user message was recorded before sending; nothing else was.
        assert_eq!(w.store().messages(), &[Message::user("my name is Alex and I have acne")]);
        assert!(!w.store().profile().has_context());

        // Exactly one failure bubble after the user bubble.
        assert_eq!(w.renderer().bubbles().len(), 3);
        assert!(!w.renderer().is_typing());
        assert!(w.renderer().is_enabled());
        assert!(w.renderer().is_focused());
        assert_eq!(w.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn test_turn_event_order_on_success() {
        let transport = MockTransport::new().reply("hi", false);
        let mut w = ChatWidget::new(transport, RecordingRenderer::default(), ChatConfig::default());
        w.renderer_mut().events.clear();
        w.submit("hello").await.unwrap();

        assert_eq!(
            w.renderer().events,
            vec![
                "enabled:false",
                "append:user:hello",
                "show_typing",
                "hide_typing",
                "append:ai:hi",
                "enabled:true",
                "focus",
            ]
        );
    }

    #[tokio::test]
    async fn test_turn_event_order_on_failure() {
        let transport = MockTransport::new().fail(api(401));
        let mut w = ChatWidget::new(transport, RecordingRenderer::default(), ChatConfig::default());
        w.renderer_mut().events.clear();
        w.submit("hello").await.unwrap();

        let events = &w.renderer().events;
        assert_eq!(events.len(), 7);
        assert_eq!(events[2], "show_typing");
        assert_eq!(events[3], "hide_typing");
        assert!(events[4].starts_with("append:ai:There's an issue with the API key"));
        assert_eq!(events[5], "enabled:true");
        assert_eq!(events[6], "focus");
    }

    // ---- Ignored input ----

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut w = widget(MockTransport::new());
        let outcome = w.submit("   \n\t").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Ignored));
        assert!(w.store().is_empty());
        assert_eq!(w.renderer().bubbles().len(), 1);
        assert!(w.transport().requests().is_empty());
    }

    // ---- In-flight guard ----

    #[tokio::test]
    async fn test_submit_and_reset_rejected_while_sending() {
        let mut w = widget(MockTransport::new());
        w.state = TurnState::Sending;
        assert!(matches!(
            w.submit("hi").await,
            Err(ChatError::TurnInFlight)
        ));
        assert!(matches!(w.reset(), Err(ChatError::TurnInFlight)));
    }

    // ---- Reset ----

    #[tokio::test]
    async fn test_reset_clears_session_and_regreets() {
        let mut w = widget(MockTransport::new().reply("Try a serum", false));
        w.submit("My name is Alex, I have dry skin and I'm worried about acne")
            .await
            .unwrap();
        let profile = w.store().profile();
        assert_eq!(profile.name.as_deref(), Some("Alex"));
        assert_eq!(profile.skin_type, Some(SkinType::Dry));
        let old_session = w.store().id();

        w.reset().unwrap();

        assert!(w.store().is_empty());
        assert!(!w.store().profile().has_context());
        assert_ne!(w.store().id(), old_session);
        assert_eq!(w.renderer().bubbles().len(), 1);
        assert!(w.renderer().bubbles()[0].contains(DEFAULT_GREETING));
    }

    // ---- Context summary ----

    #[tokio::test]
    async fn test_context_summary() {
        let mut w = widget(MockTransport::new().reply("Use sunscreen", false));
        w.submit("call me Jo").await.unwrap();
        let summary = w.context_summary();
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.profile.name.as_deref(), Some("Jo"));
        assert_eq!(summary.profile.previous_products, vec!["sunscreen"]);
        assert_eq!(summary.session_id, w.store().id());
    }
}
