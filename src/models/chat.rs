//! Chat Models
//!
//! Wire shapes for the turn endpoint and the health probes.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/turns`
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    /// The user the turn is issued for; must match the verified credential
    pub user_id: String,
    /// The user's message for this turn
    pub message: String,
    /// Existing conversation to continue; a new one is created when absent
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Response body for `POST /api/turns`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    /// The assistant's reply for this turn
    pub reply: String,
    /// The conversation the turn belongs to
    pub conversation_id: String,
    /// True when the reply is a fallback because reasoning or a tool
    /// failed after the user's message was stored
    pub degraded: bool,
}

/// Response body for `GET /healthz`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
}

/// One readiness check result
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessCheck {
    pub name: String,
    pub ok: bool,
}

/// Response body for `GET /readyz`
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<ReadinessCheck>,
}
