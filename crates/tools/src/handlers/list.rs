//! List Tasks Handler

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use taskline_core::{TaskFilters, TaskPriority, TaskStatus, TaskStore};
use taskline_llm::ParameterSchema;

use super::parse_args;
use crate::outcome::{ToolOutcome, ToolResult};
use crate::trait_def::{Tool, ToolExecutionContext};

/// Arguments for `list_tasks`; all filters are optional and ANDed
#[derive(Debug, Deserialize, Default)]
pub struct ListTasksArgs {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub due_before: Option<DateTime<Utc>>,
}

/// List the caller's tasks, optionally filtered
pub struct ListTasks;

#[async_trait]
impl Tool for ListTasks {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "List the user's tasks. Optional filters on status, priority, tag, \
         and due date are combined with AND semantics."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "status".to_string(),
            ParameterSchema::string_enum(Some("Filter by status"), &["pending", "completed"]),
        );
        properties.insert(
            "priority".to_string(),
            ParameterSchema::string_enum(Some("Filter by priority"), &["low", "medium", "high"]),
        );
        properties.insert(
            "tag".to_string(),
            ParameterSchema::string(Some("Keep only tasks carrying this tag")),
        );
        properties.insert(
            "due_before".to_string(),
            ParameterSchema::string(Some(
                "Keep only tasks due before this RFC 3339 timestamp",
            )),
        );
        ParameterSchema::object(None, properties, vec![])
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let args: ListTasksArgs = parse_args(self.name(), args)?;
        let filters = TaskFilters {
            status: args.status,
            priority: args.priority,
            tag: args.tag,
            due_before: args.due_before,
        };

        let tasks = ctx.tasks.list(&ctx.user_id, &filters).await?;

        // An empty result is a successful answer, not an error.
        let summary = if tasks.is_empty() {
            if filters.is_empty() {
                "You have no tasks.".to_string()
            } else {
                "No tasks match those filters.".to_string()
            }
        } else {
            let mut text = format!(
                "You have {} task{}:",
                tasks.len(),
                if tasks.len() == 1 { "" } else { "s" }
            );
            for task in &tasks {
                text.push_str(&format!("\n- {} [{}]", task.title, task.priority));
                if let Some(due) = task.due_date {
                    text.push_str(&format!(" due {}", due.format("%Y-%m-%d")));
                }
                if task.status == TaskStatus::Completed {
                    text.push_str(" (completed)");
                }
            }
            text
        };

        let data = serde_json::json!({
            "count": tasks.len(),
            "tasks": tasks,
        });
        Ok(ToolOutcome::applied(summary, data))
    }
}
