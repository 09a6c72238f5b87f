//! Conversation and Message Records
//!
//! Conversations are owned by exactly one user and fixed to that user at
//! creation. Messages are append-only; `seq` increases strictly within a
//! conversation and is the only ordering key context assembly relies on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    /// Parse from the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A conversation between one user and the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation id (UUIDv4)
    pub id: String,
    /// Owning user, immutable after creation
    pub user_id: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent turn
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation owned by `user_id`
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One stored message inside a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id (UUIDv4)
    pub id: String,
    /// Parent conversation
    pub conversation_id: String,
    /// Author role
    pub role: ChatRole,
    /// Text content
    pub content: String,
    /// Strictly increasing position within the conversation
    pub seq: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message record; `seq` is assigned by the store on append
    pub fn new(
        conversation_id: impl Into<String>,
        role: ChatRole,
        content: impl Into<String>,
        seq: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            role,
            content: content.into(),
            seq,
            created_at: Utc::now(),
        }
    }
}
