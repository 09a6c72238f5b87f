//! Tool Handlers
//!
//! One file per task operation. Handlers are stateless; everything they
//! need arrives through `ToolExecutionContext` and their typed arguments.

mod add;
mod complete;
mod delete;
mod list;
mod update;

pub use add::AddTask;
pub use complete::CompleteTask;
pub use delete::DeleteTask;
pub use list::ListTasks;
pub use update::UpdateTask;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::outcome::ToolError;

/// Deserialize tool arguments into their typed form.
///
/// The reasoning step produces arbitrary JSON; any shape mismatch is a
/// validation error, not a crash.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::Validation(format!("invalid arguments for {}: {}", tool, e)))
}
