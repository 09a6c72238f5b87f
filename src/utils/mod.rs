//! Utilities
//!
//! Cross-cutting helpers for the server crate.

pub mod paths;
