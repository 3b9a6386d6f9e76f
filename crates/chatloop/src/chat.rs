//! Chat and message records.
//!
//! A [`Chat`] owns an ordered list of [`Message`]s; ordering by creation
//! time defines the conversation history that is replayed to the LLM on
//! every turn. Messages are immutable once created — edits are modeled as
//! new messages, never mutation.
//!
//! [`Message::transient`] builds a message that is assembled for an
//! outbound prompt but never persisted (augmented prompts, correction
//! prompts, synthesis prompts). Transient messages carry the nil chat id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The end user.
    User,
    /// The assistant (LLM-generated).
    Assistant,
    /// Instruction text injected by the application.
    System,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
            Self::System => f.write_str("system"),
        }
    }
}

/// A single message in a conversation.
///
/// Immutable once created. Owned by its chat and deleted with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id.
    pub id: Uuid,
    /// The chat this message belongs to. Nil for transient prompt turns.
    pub chat_id: Uuid,
    /// Who authored the message.
    pub role: ChatRole,
    /// The message text.
    pub content: String,
    /// Creation timestamp; ordering by this field defines history order.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message with a fresh id and the current timestamp.
    pub fn new(chat_id: Uuid, role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Creates a user message.
    pub fn user(chat_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(chat_id, ChatRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(chat_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(chat_id, ChatRole::Assistant, content)
    }

    /// Creates a system message.
    pub fn system(chat_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(chat_id, ChatRole::System, content)
    }

    /// Creates a message that is sent to the LLM but never persisted
    /// (augmented prompts, correction prompts). Carries the nil chat id.
    pub fn transient(role: ChatRole, content: impl Into<String>) -> Self {
        Self::new(Uuid::nil(), role, content)
    }
}

/// A conversation: metadata plus its ordered messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat id.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Bumped on every appended message.
    pub updated_at: DateTime<Utc>,
    /// Messages in creation order.
    pub messages: Vec<Message>,
}

impl Chat {
    /// Creates an empty chat with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Appends a message, bumping `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.updated_at = message.created_at;
        self.messages.push(message);
    }
}
