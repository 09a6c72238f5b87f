//! Complete Task Handler

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use taskline_core::{Recurrence, TaskStatus, TaskStore};
use taskline_llm::ParameterSchema;

use super::parse_args;
use crate::outcome::{TaskCandidate, ToolError, ToolOutcome, ToolResult};
use crate::resolve::{resolve_task_ref, Resolution};
use crate::trait_def::{Tool, ToolExecutionContext};

/// Arguments for `complete_task`
#[derive(Debug, Deserialize)]
pub struct CompleteTaskArgs {
    /// Task id or free-text reference
    pub task_ref: String,
}

/// Mark a task completed; recurring tasks spawn their next occurrence
pub struct CompleteTask;

#[async_trait]
impl Tool for CompleteTask {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn description(&self) -> &str {
        "Mark a task as completed. Accepts a task id or a phrase from the \
         title. Completing a recurring task schedules its next occurrence."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "task_ref".to_string(),
            ParameterSchema::string(Some("Task id or words from the task title")),
        );
        ParameterSchema::object(None, properties, vec!["task_ref".to_string()])
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let args: CompleteTaskArgs = parse_args(self.name(), args)?;

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

        // Repeating a completion (e.g. a client retry) must not spawn a
        // second occurrence.
        if task.status == TaskStatus::Completed {
            let data = serde_json::to_value(&task)
                .map_err(|e| ToolError::Storage(e.to_string()))?;
            return Ok(ToolOutcome::applied(
                format!("\"{}\" was already completed.", task.title),
                data,
            ));
        }

        let completed_at = Utc::now();
        let completed = ctx
            .tasks
            .set_status(&ctx.user_id, &task.id, TaskStatus::Completed)
            .await?
            .ok_or_else(|| ToolError::NotFound(format!("no task matching \"{}\"", task.id)))?;

        let mut summary = format!("Completed \"{}\".", completed.title);
        let mut next_json = None;
        if completed.recurrence != Recurrence::None {
            if let Some(next) = completed.next_occurrence(completed_at) {
                ctx.tasks.insert(&next).await?;
                debug!(task_id = %next.id, "scheduled next occurrence");
                if let Some(due) = next.due_date {
                    summary.push_str(&format!(
                        " The next occurrence is due {}.",
                        due.format("%Y-%m-%d")
                    ));
                }
                next_json = Some(serde_json::to_value(&next)
                    .map_err(|e| ToolError::Storage(e.to_string()))?);
            }
        }

        let data = serde_json::json!({
            "completed": completed,
            "next_occurrence": next_json,
        });
        Ok(ToolOutcome::applied(summary, data))
    }
}
