//! Conversation message types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text shown in an assistant placeholder while its reply is in flight.
pub const PENDING_TEXT: &str = "Thinking…";

/// Represents the role of a message in a conversation.
///
/// The serialized form is lowercase, matching the `{role, content}` pairs the
/// chat endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
    /// System-generated message.
    System,
}

impl MessageRole {
    /// Returns the lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// A single message in a conversation.
///
/// Each message has a unique id (used only for list reconciliation), a role,
/// display text, and a timestamp. `pending` is true only for an assistant
/// message whose reply has not resolved yet; the text of a pending message is
/// the only mutable content in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The display content of the message.
    pub text: String,
    /// True while an assistant reply is still in flight.
    #[serde(default)]
    pub pending: bool,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
}

impl Message {
    fn new(role: MessageRole, text: impl Into<String>, pending: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            pending,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text, false)
    }

    /// Creates a resolved assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text, false)
    }

    /// Creates an assistant placeholder awaiting its resolved text.
    pub fn pending_assistant() -> Self {
        Self::new(MessageRole::Assistant, PENDING_TEXT, true)
    }

    /// Creates a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, text, false)
    }
}
