//! Message and Transcript domain types.
//!
//! These are the core value objects that flow through a turn:
//! User types a line → Agent routes it → tool or provider answers → both
//! messages land in the transcript and the session file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    #[default]
    User,
    /// The AI assistant (or a tool shortcut answering on its behalf)
    Assistant,
    /// System instructions
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation.
///
/// Serializes to exactly `{role, content, timestamp}`, which is also the
/// session file line format. Missing fields deserialize as a user message,
/// empty content and the current time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    #[serde(default)]
    pub role: Role,

    /// The text content
    #[serde(default)]
    pub content: String,

    /// Creation time (UTC)
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Text of the most recent user message, or `""` if there is none.
pub fn latest_user_text(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// An ordered, append-only sequence of messages owned by one agent.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove and return the last message. Used to undo the user message of
    /// a turn whose provider call failed.
    pub fn pop(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn latest_user_text(&self) -> &str {
        latest_user_text(&self.messages)
    }

    /// The final user/assistant pair, if the transcript ends with one.
    pub fn last_exchange(&self) -> Option<(&Message, &Message)> {
        match self.messages.as_slice() {
            [.., user, assistant] if user.role == Role::User && assistant.role == Role::Assistant => {
                Some((user, assistant))
            }
            _ => None,
        }
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}
