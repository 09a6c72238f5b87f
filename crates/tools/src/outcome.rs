//! Tool Outcomes
//!
//! The result shape every tool handler produces. Disambiguation is a
//! first-class outcome, not an error: when a free-text task reference
//! matches several tasks, the handler reports the candidates and mutates
//! nothing, and the orchestrator turns that into a clarifying question.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskline_core::{CoreError, Task};

/// A candidate task offered back to the user for disambiguation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCandidate {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&Task> for TaskCandidate {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            due_date: task.due_date,
        }
    }
}

/// Successful outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The operation was applied; `summary` is ready for the reply and
    /// `data` carries the structured payload
    Applied {
        summary: String,
        data: serde_json::Value,
    },
    /// The task reference matched more than one task; nothing was mutated
    Disambiguation {
        reference: String,
        candidates: Vec<TaskCandidate>,
    },
}

impl ToolOutcome {
    /// Create an applied outcome
    pub fn applied(summary: impl Into<String>, data: serde_json::Value) -> Self {
        Self::Applied {
            summary: summary.into(),
            data,
        }
    }

    /// Human-readable form used when composing the assistant reply
    pub fn summary_text(&self) -> String {
        match self {
            ToolOutcome::Applied { summary, .. } => summary.clone(),
            ToolOutcome::Disambiguation {
                reference,
                candidates,
            } => {
                let mut text = format!(
                    "I found {} tasks matching \"{}\". Which one did you mean?",
                    candidates.len(),
                    reference
                );
                for candidate in candidates {
                    text.push_str(&format!("\n- {} ({})", candidate.title, candidate.id));
                }
                text
            }
        }
    }

    /// Whether this outcome needs a clarifying follow-up from the user
    pub fn needs_clarification(&self) -> bool {
        matches!(self, ToolOutcome::Disambiguation { .. })
    }
}

/// Errors a tool handler can produce
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// No task scoped to the caller matched the reference
    #[error("Not found: {0}")]
    NotFound(String),

    /// The underlying store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The reasoning step named a tool that does not exist
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<CoreError> for ToolError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => ToolError::NotFound(msg),
            CoreError::Validation(msg) => ToolError::Validation(msg),
            other => ToolError::Storage(other.to_string()),
        }
    }
}

impl From<ToolError> for CoreError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Validation(msg) => CoreError::Validation(msg),
            ToolError::UnknownTool(name) => {
                CoreError::Validation(format!("unknown tool: {}", name))
            }
            ToolError::NotFound(msg) => CoreError::NotFound(msg),
            ToolError::Storage(msg) => CoreError::ToolExecution(msg),
        }
    }
}

/// Result type for tool executions
pub type ToolResult = Result<ToolOutcome, ToolError>;
