//! Store Traits
//!
//! Contracts between the domain and the persistence adapter. The server
//! crate implements these against SQLite; tests substitute in-memory
//! databases. Tool handlers and the orchestrator only ever see these
//! traits, never the database itself.
//!
//! Every method takes the verified caller identity where ownership is in
//! play. Implementations must filter by it in the query itself, not after
//! the fact.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::{ChatMessage, ChatRole, Conversation};
use crate::error::CoreResult;
use crate::task::{Recurrence, Task, TaskPriority, TaskStatus};

/// Filters for listing tasks; all supplied filters must match (AND)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilters {
    /// Keep only tasks with this status
    pub status: Option<TaskStatus>,
    /// Keep only tasks with this priority
    pub priority: Option<TaskPriority>,
    /// Keep only tasks carrying this tag
    pub tag: Option<String>,
    /// Keep only tasks due strictly before this instant
    pub due_before: Option<DateTime<Utc>>,
}

impl TaskFilters {
    /// Whether no filter is active
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.tag.is_none()
            && self.due_before.is_none()
    }
}

/// Partial update for a task; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub recurrence: Option<Recurrence>,
}

impl TaskPatch {
    /// Whether the patch changes anything at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.recurrence.is_none()
    }
}

/// Persistence contract for conversations and their messages
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a new conversation owned by `user_id`
    async fn create_conversation(&self, user_id: &str) -> CoreResult<Conversation>;

    /// Load a conversation, verifying ownership.
    ///
    /// Returns `NotFound` when no such conversation exists and
    /// `Unauthorized` when it exists but belongs to a different user.
    async fn load_conversation(&self, id: &str, caller_user_id: &str)
        -> CoreResult<Conversation>;

    /// Load all messages of a conversation ordered by `seq`
    async fn load_messages(&self, conversation_id: &str) -> CoreResult<Vec<ChatMessage>>;

    /// Append a message; the store assigns the next `seq` transactionally
    async fn append_message(
        &self,
        conversation_id: &str,
        role: ChatRole,
        content: &str,
    ) -> CoreResult<ChatMessage>;

    /// Bump the conversation's `updated_at`
    async fn touch(&self, conversation_id: &str) -> CoreResult<()>;
}

/// Persistence contract for tasks; tool handlers are the only callers
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task row
    async fn insert(&self, task: &Task) -> CoreResult<()>;

    /// Fetch one task by id, scoped to `user_id`
    async fn get(&self, user_id: &str, id: &str) -> CoreResult<Option<Task>>;

    /// List tasks scoped to `user_id` matching all supplied filters
    async fn list(&self, user_id: &str, filters: &TaskFilters) -> CoreResult<Vec<Task>>;

    /// Find open tasks whose title contains `needle` (case-insensitive),
    /// scoped to `user_id`. Used for free-text task references.
    async fn find_open_by_title(&self, user_id: &str, needle: &str) -> CoreResult<Vec<Task>>;

    /// Apply a partial update; returns the updated task or `None` when no
    /// task scoped to `user_id` matches `id`
    async fn update(&self, user_id: &str, id: &str, patch: &TaskPatch)
        -> CoreResult<Option<Task>>;

    /// Set the status of a task; returns the updated task or `None` when
    /// no task scoped to `user_id` matches `id`
    async fn set_status(
        &self,
        user_id: &str,
        id: &str,
        status: TaskStatus,
    ) -> CoreResult<Option<Task>>;

    /// Hard-delete a task; returns whether a row was removed
    async fn delete(&self, user_id: &str, id: &str) -> CoreResult<bool>;
}
