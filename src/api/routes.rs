//! Routes and Handlers
//!
//! `POST /api/turns` carries one chat turn; `GET /healthz` answers
//! whenever the process is alive; `GET /readyz` additionally checks the
//! database. Reasoning-capability connectivity is deliberately not gated
//! in readiness — its unavailability is the breaker's job, not the load
//! balancer's.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};

use taskline_core::CoreError;

use crate::models::chat::{
    HealthResponse, ReadinessCheck, ReadinessResponse, TurnRequest, TurnResponse,
};
use crate::state::AppState;

use super::error::ApiError;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/turns", post(send_turn))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

/// Extract the bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError(CoreError::unauthenticated("missing Authorization header")))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError(CoreError::unauthenticated("malformed Authorization header")))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError(CoreError::unauthenticated("expected Bearer credential")))
}

/// One chat turn
async fn send_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let user_id = state.verifier.verify(token)?;
    let response = state.turns.handle_turn(&user_id, request).await?;
    Ok(Json(response))
}

/// Liveness probe; no auth, no dependencies
async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness probe; checks the persistence adapter can reach its store
async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database_ok = state.database.is_healthy();
    let checks = vec![ReadinessCheck {
        name: "database".to_string(),
        ok: database_ok,
    }];
    let ready = checks.iter().all(|c| c.ok);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadinessResponse { ready, checks }))
}
