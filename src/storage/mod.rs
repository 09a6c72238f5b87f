//! Storage Layer
//!
//! Handles all data persistence: the pooled SQLite database, the store
//! implementations the domain traits are wired to, and the JSON config.

pub mod config;
pub mod conversations;
pub mod database;
pub mod tasks;

pub use config::ConfigService;
pub use conversations::SqliteConversationStore;
pub use database::{Database, DbPool};
pub use tasks::SqliteTaskStore;
