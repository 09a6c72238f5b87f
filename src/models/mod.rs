//! Data Models
//!
//! Request/response shapes for the HTTP surface and the server
//! configuration model.

pub mod chat;
pub mod settings;
