//! Conversation message types.

use serde::{Deserialize, Serialize};

/// Represents the speaker of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Message typed by the user.
    User,
    /// Message generated by the model.
    Assistant,
}

impl Role {
    /// The speaker label used when a turn is rendered into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single message in the conversation history.
///
/// Turns are never edited after they are appended to a
/// [`ConversationHistory`](super::ConversationHistory); the history only
/// hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// The speaker of the message.
    pub role: Role,
    /// The message text.
    pub content: String,
    /// Timestamp when the message was created (RFC 3339 format).
    pub timestamp: String,
}

impl ConversationTurn {
    /// Creates a turn stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Shorthand for a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
