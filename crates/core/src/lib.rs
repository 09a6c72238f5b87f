//! Taskline Core
//!
//! Foundation crate for the Taskline workspace: domain entities
//! (tasks, conversations, messages), the store traits the server
//! implements, and the error taxonomy shared by every layer.
//!
//! This crate is intentionally light on dependencies so that the tool
//! handlers and the server can both build on it without pulling in
//! storage or HTTP machinery.

pub mod conversation;
pub mod error;
pub mod store;
pub mod task;

pub use conversation::{ChatMessage, ChatRole, Conversation};
pub use error::{CoreError, CoreResult};
pub use store::{ConversationStore, TaskFilters, TaskPatch, TaskStore};
pub use task::{Recurrence, Task, TaskPriority, TaskStatus};
