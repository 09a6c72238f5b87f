//! Add Task Handler

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use taskline_core::task::MAX_TITLE_LEN;
use taskline_core::{Recurrence, Task, TaskPriority, TaskStore};
use taskline_llm::ParameterSchema;

use super::parse_args;
use crate::outcome::{ToolError, ToolOutcome, ToolResult};
use crate::trait_def::{Tool, ToolExecutionContext};

/// Arguments for `add_task`
#[derive(Debug, Deserialize)]
pub struct AddTaskArgs {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

/// Create a new task owned by the caller
pub struct AddTask;

#[async_trait]
impl Tool for AddTask {
    fn name(&self) -> &str {
        "add_task"
    }

    fn description(&self) -> &str {
        "Create a new task. Requires a title; description, priority, due date, \
         tags, and recurrence are optional."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "title".to_string(),
            ParameterSchema::string(Some("Short task title")),
        );
        properties.insert(
            "description".to_string(),
            ParameterSchema::string(Some("Optional longer description")),
        );
        properties.insert(
            "priority".to_string(),
            ParameterSchema::string_enum(Some("Task priority"), &["low", "medium", "high"]),
        );
        properties.insert(
            "due_date".to_string(),
            ParameterSchema::string(Some("Due date as an RFC 3339 timestamp")),
        );
        properties.insert(
            "tags".to_string(),
            ParameterSchema::array(Some("Free-form tags"), ParameterSchema::string(None)),
        );
        properties.insert(
            "recurrence".to_string(),
            ParameterSchema::string_enum(
                Some("Recurrence schedule"),
                &["none", "daily", "weekly", "monthly"],
            ),
        );
        ParameterSchema::object(None, properties, vec!["title".to_string()])
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let args: AddTaskArgs = parse_args(self.name(), args)?;

        let title = args.title.trim();
        if title.is_empty() {
            return Err(ToolError::validation("title must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ToolError::Validation(format!(
                "title exceeds {} characters",
                MAX_TITLE_LEN
            )));
        }

        let mut task = Task::new(&ctx.user_id, title);
        task.description = args.description.filter(|d| !d.trim().is_empty());
        if let Some(priority) = args.priority {
            task.priority = priority;
        }
        task.due_date = args.due_date;
        if let Some(tags) = args.tags {
            task.tags = tags;
        }
        if let Some(recurrence) = args.recurrence {
            task.recurrence = recurrence;
        }

        ctx.tasks.insert(&task).await?;

        let mut summary = format!("Added task \"{}\"", task.title);
        if let Some(due) = task.due_date {
            summary.push_str(&format!(", due {}", due.format("%Y-%m-%d")));
        }
        if task.recurrence != Recurrence::None {
            summary.push_str(&format!(", repeating {}", task.recurrence));
        }
        summary.push('.');

        let data = serde_json::to_value(&task)
            .map_err(|e| ToolError::Storage(e.to_string()))?;
        Ok(ToolOutcome::applied(summary, data))
    }
}
