//! Client-side conversation state machine.
//!
//! A `Conversation` owns the ordered message list, the composer draft, and
//! the single-exchange-at-a-time guard. It performs no I/O: the caller runs
//! the actual exchange and feeds the outcome back through
//! [`Conversation::resolve_exchange`].

use crate::error::ParleyError;

use super::message::Message;

/// The assistant greeting every new conversation is seeded with.
pub const WELCOME_TEXT: &str = "Hi! I'm your assistant. Ask me anything ✨";

/// Everything the transport layer needs to run one exchange.
///
/// `history` is the snapshot to send: all prior messages plus the new user
/// turn, and never the pending placeholder itself.
#[derive(Debug, Clone)]
pub struct OutboundExchange {
    /// Id of the placeholder to resolve when the exchange completes.
    pub placeholder_id: String,
    /// Full history including the new user turn.
    pub history: Vec<Message>,
}

/// Ordered message list plus composer state for one chat screen.
///
/// Invariants:
/// - at most one message is `pending` at any time, enforced by the `sending`
///   guard (a new exchange cannot begin while one is outstanding);
/// - the message sequence is append-only, except for the single in-place
///   resolution of a placeholder's `text`/`pending` fields.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    draft: String,
    sending: bool,
}

impl Conversation {
    /// Creates a conversation seeded with the assistant welcome message.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(WELCOME_TEXT)],
            draft: String::new(),
            sending: false,
        }
    }

    /// The ordered message sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current composer content.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the composer content.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// True while an exchange is outstanding.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// True when the draft would be accepted by [`Self::begin_exchange`].
    pub fn can_send(&self) -> bool {
        !self.draft.trim().is_empty() && !self.sending
    }

    /// Starts an exchange from the current draft.
    ///
    /// Appends the user message and a pending assistant placeholder, clears
    /// the composer, and raises the `sending` guard. Returns `None` without
    /// touching any state when the trimmed draft is empty or an exchange is
    /// already in flight.
    pub fn begin_exchange(&mut self) -> Option<OutboundExchange> {
        let text = self.draft.trim();
        if text.is_empty() || self.sending {
            return None;
        }

        let user_msg = Message::user(text);
        self.messages.push(user_msg);

        // History snapshot is taken before the placeholder goes in.
        let history = self.messages.clone();

        let placeholder = Message::pending_assistant();
        let placeholder_id = placeholder.id.clone();
        self.messages.push(placeholder);

        self.draft.clear();
        self.sending = true;

        Some(OutboundExchange {
            placeholder_id,
            history,
        })
    }

    /// Resolves the outstanding placeholder with the exchange outcome.
    ///
    /// On success the placeholder takes the reply text; on failure it takes
    /// an error description. Either way `pending` clears and the `sending`
    /// guard drops, so a placeholder is never left pending permanently.
    ///
    /// Returns a clone of the resolved message, or `None` if no pending
    /// message with that id exists.
    pub fn resolve_exchange(
        &mut self,
        placeholder_id: &str,
        outcome: Result<String, ParleyError>,
    ) -> Option<Message> {
        self.sending = false;

        let msg = self
            .messages
            .iter_mut()
            .find(|m| m.pending && m.id == placeholder_id)?;

        msg.text = match outcome {
            Ok(reply) => reply,
            Err(err) => format!("Error: {}", err),
        };
        msg.pending = false;

        Some(msg.clone())
    }

    /// Number of messages currently pending. Never exceeds one.
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
