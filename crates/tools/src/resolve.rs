//! Task Reference Resolution
//!
//! Tool calls may reference a task by id or by free text. Resolution tries
//! the id first, then falls back to a case-insensitive title match over
//! the caller's *open* tasks. Multiple hits are reported as candidates —
//! handlers never guess.

use taskline_core::{Task, TaskStore};

use crate::outcome::ToolError;
use crate::trait_def::ToolExecutionContext;

/// Result of resolving a task reference
#[derive(Debug)]
pub enum Resolution {
    /// Nothing matched
    None,
    /// Exactly one task matched
    One(Task),
    /// Several tasks matched; the caller must disambiguate
    Many(Vec<Task>),
}

/// Resolve `task_ref` against the caller's tasks.
///
/// An id hit wins outright even when the id text would also match titles;
/// ids are unambiguous by construction.
pub async fn resolve_task_ref(
    ctx: &ToolExecutionContext,
    task_ref: &str,
) -> Result<Resolution, ToolError> {
    let task_ref = task_ref.trim();
    if task_ref.is_empty() {
        return Err(ToolError::validation("task reference must not be empty"));
    }

    if let Some(task) = ctx.tasks.get(&ctx.user_id, task_ref).await? {
        return Ok(Resolution::One(task));
    }

    let mut matches = ctx.tasks.find_open_by_title(&ctx.user_id, task_ref).await?;
    match matches.len() {
        0 => Ok(Resolution::None),
        1 => Ok(Resolution::One(matches.remove(0))),
        _ => Ok(Resolution::Many(matches)),
    }
}
