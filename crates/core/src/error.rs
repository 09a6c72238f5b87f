//! Core Error Types
//!
//! Defines the error taxonomy used across the Taskline workspace.
//! The variants mirror the outcomes the HTTP layer has to distinguish;
//! the server crate maps them onto status codes in one place.

use thiserror::Error;

/// Core error type for the Taskline workspace.
///
/// `Unauthorized` is deliberately separate from `NotFound`: internally the
/// stores report ownership mismatches precisely, and only the API boundary
/// collapses the two so callers cannot probe for resource existence.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or invalid credential
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Verified identity does not match the requested identity
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource exists but belongs to a different user (internal kind)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or rejected input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A call exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The reasoning capability is unavailable (breaker open or call failed)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A tool handler failed after the call was admitted
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Persistence layer errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an unauthenticated error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a service unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller may safely retry the operation that produced this
    /// error. Timeouts and unavailability are transient; everything else
    /// either already happened or will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ServiceUnavailable(_))
    }
}
