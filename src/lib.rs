//! Taskline Server - Rust Backend Library
//!
//! This library provides the backend for the Taskline conversational
//! task-management server. It includes:
//! - The HTTP surface (turn endpoint plus liveness/readiness probes)
//! - The turn orchestrator and context assembler
//! - Storage layer (SQLite conversations, messages, and tasks)
//! - Configuration and credential verification

pub mod api;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::chat::{TurnRequest, TurnResponse};
pub use models::settings::ServerConfig;
pub use state::AppState;
pub use storage::{Database, SqliteConversationStore, SqliteTaskStore};
