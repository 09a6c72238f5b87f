//! API Error Mapping
//!
//! Collapses the core error taxonomy onto HTTP status codes in one place.
//! `Unauthorized` (resource owned by someone else) is deliberately
//! indistinguishable from `NotFound` on the wire so callers cannot probe
//! for the existence of other users' resources.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use taskline_core::CoreError;

/// Error wrapper implementing axum's response conversion
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code and external message for the wrapped error
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            CoreError::Unauthenticated(_) => {
                (StatusCode::UNAUTHORIZED, "authentication required".into())
            }
            CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden".into()),
            CoreError::NotFound(_) | CoreError::Unauthorized(_) => {
                (StatusCode::NOT_FOUND, "not found".into())
            }
            CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CoreError::Timeout(_) | CoreError::ServiceUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service unavailable, retry later".into(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}
