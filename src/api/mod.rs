//! HTTP Surface
//!
//! The inbound API: one turn endpoint plus the liveness and readiness
//! probes. Everything else in the system is reached through the services
//! layer, never from here directly.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::router;
