//! Delete Task Handler

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use taskline_core::TaskStore;
use taskline_llm::ParameterSchema;

use super::parse_args;
use crate::outcome::{TaskCandidate, ToolError, ToolOutcome, ToolResult};
use crate::resolve::{resolve_task_ref, Resolution};
use crate::trait_def::{Tool, ToolExecutionContext};

/// Arguments for `delete_task`
#[derive(Debug, Deserialize)]
pub struct DeleteTaskArgs {
    /// Task id or free-text reference
    pub task_ref: String,
}

/// Hard-delete a task
pub struct DeleteTask;

#[async_trait]
impl Tool for DeleteTask {
    fn name(&self) -> &str {
        "delete_task"
    }

    fn description(&self) -> &str {
        "Delete a task permanently. Accepts a task id or a phrase from the \
         title."
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
        let args: DeleteTaskArgs = parse_args(self.name(), args)?;

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

        let removed = ctx.tasks.delete(&ctx.user_id, &task.id).await?;
        if !removed {
            return Err(ToolError::NotFound(format!(
                "no task matching \"{}\"",
                task.id
            )));
        }

        let data = serde_json::json!({"deleted": task.id, "title": task.title});
        Ok(ToolOutcome::applied(
            format!("Deleted \"{}\".", task.title),
            data,
        ))
    }
}
