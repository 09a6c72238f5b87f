//! Business Logic Services
//!
//! Credential verification, context assembly, and the turn orchestrator.

pub mod auth;
pub mod context;
pub mod turn;

pub use auth::{CredentialVerifier, TokenTableVerifier};
pub use context::ContextAssembler;
pub use turn::{TurnService, FALLBACK_REPLY};
