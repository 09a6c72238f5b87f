//! Task Entity
//!
//! The task record and its enums. Tasks are owned by exactly one user and
//! are only ever created or mutated through the tool handlers.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted length for a task title, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Task completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    /// Stable string form used in storage and tool arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parse from the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Stable string form used in storage and tool arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Parse from the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recurrence schedule for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// Stable string form used in storage and tool arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    /// Parse from the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Recurrence::None),
            "daily" => Some(Recurrence::Daily),
            "weekly" => Some(Recurrence::Weekly),
            "monthly" => Some(Recurrence::Monthly),
            _ => None,
        }
    }

    /// Advance a due date by one recurrence unit.
    ///
    /// Monthly advancement clamps to the last day of the target month
    /// (Jan 31 -> Feb 28/29). Returns `None` for non-recurring schedules.
    pub fn advance(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some(from + chrono::Duration::days(1)),
            Recurrence::Weekly => Some(from + chrono::Duration::days(7)),
            Recurrence::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::None
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A task owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task id (UUIDv4)
    pub id: String,
    /// Owning user; every store query is scoped by this
    pub user_id: String,
    /// Short title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Priority, defaults to medium
    pub priority: TaskPriority,
    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
    /// Completion status
    pub status: TaskStatus,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Recurrence schedule
    pub recurrence: Recurrence,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task with defaults
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            priority: TaskPriority::default(),
            due_date: None,
            status: TaskStatus::Pending,
            tags: Vec::new(),
            recurrence: Recurrence::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the next occurrence of a recurring task.
    ///
    /// The successor is a fresh pending task with a new id and the due date
    /// advanced by one recurrence unit; the original row is not modified.
    /// When the task has no due date the advance is taken from the
    /// completion instant. Returns `None` for non-recurring tasks.
    pub fn next_occurrence(&self, completed_at: DateTime<Utc>) -> Option<Task> {
        let base = self.due_date.unwrap_or(completed_at);
        let next_due = self.recurrence.advance(base)?;
        let now = Utc::now();
        Some(Task {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: Some(next_due),
            status: TaskStatus::Pending,
            tags: self.tags.clone(),
            recurrence: self.recurrence,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the task is still open
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}
