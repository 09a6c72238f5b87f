//! Update Task Handler

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use taskline_core::task::MAX_TITLE_LEN;
use taskline_core::{Recurrence, TaskPatch, TaskPriority, TaskStore};
use taskline_llm::ParameterSchema;

use super::parse_args;
use crate::outcome::{TaskCandidate, ToolError, ToolOutcome, ToolResult};
use crate::resolve::{resolve_task_ref, Resolution};
use crate::trait_def::{Tool, ToolExecutionContext};

/// Arguments for `update_task`; absent fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdateTaskArgs {
    /// Task id or free-text reference
    pub task_ref: String,
    #[serde(default)]
    pub title: Option<String>,
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

/// Partially update an existing task
pub struct UpdateTask;

#[async_trait]
impl Tool for UpdateTask {
    fn name(&self) -> &str {
        "update_task"
    }

    fn description(&self) -> &str {
        "Update fields of an existing task. Only the supplied fields change; \
         everything else is preserved."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "task_ref".to_string(),
            ParameterSchema::string(Some("Task id or words from the task title")),
        );
        properties.insert(
            "title".to_string(),
            ParameterSchema::string(Some("New title")),
        );
        properties.insert(
            "description".to_string(),
            ParameterSchema::string(Some("New description")),
        );
        properties.insert(
            "priority".to_string(),
            ParameterSchema::string_enum(Some("New priority"), &["low", "medium", "high"]),
        );
        properties.insert(
            "due_date".to_string(),
            ParameterSchema::string(Some("New due date as an RFC 3339 timestamp")),
        );
        properties.insert(
            "tags".to_string(),
            ParameterSchema::array(Some("Replacement tag list"), ParameterSchema::string(None)),
        );
        properties.insert(
            "recurrence".to_string(),
            ParameterSchema::string_enum(
                Some("New recurrence schedule"),
                &["none", "daily", "weekly", "monthly"],
            ),
        );
        ParameterSchema::object(None, properties, vec!["task_ref".to_string()])
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let args: UpdateTaskArgs = parse_args(self.name(), args)?;

        if let Some(ref title) = args.title {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(ToolError::validation("title must not be empty"));
            }
            if trimmed.chars().count() > MAX_TITLE_LEN {
                return Err(ToolError::Validation(format!(
                    "title exceeds {} characters",
                    MAX_TITLE_LEN
                )));
            }
        }

        let patch = TaskPatch {
            title: args.title.map(|t| t.trim().to_string()),
            description: args.description,
            priority: args.priority,
            due_date: args.due_date,
            tags: args.tags,
            recurrence: args.recurrence,
        };
        if patch.is_empty() {
            return Err(ToolError::validation("no fields to update"));
        }

        let task = match resolve_task_ref(ctx, &args.task_ref).await? {
            Resolution::None => {
                return Err(ToolError::NotFound(format!(
                    "no task matching \"{}\"",
                    args.task_ref
                )))
            }
            Resolution::Many(candidates) => {
                return Ok(ToolOutcome::Disambiguation {
                    reference: args.task_ref,
                    candidates: candidates.iter().map(TaskCandidate::from).collect(),
                })
            }
            Resolution::One(task) => task,
        };

        let updated = ctx
            .tasks
            .update(&ctx.user_id, &task.id, &patch)
            .await?
            .ok_or_else(|| ToolError::NotFound(format!("no task matching \"{}\"", task.id)))?;

        let data = serde_json::to_value(&updated)
            .map_err(|e| ToolError::Storage(e.to_string()))?;
        Ok(ToolOutcome::applied(
            format!("Updated \"{}\".", updated.title),
            data,
        ))
    }
}
