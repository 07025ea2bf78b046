//! Maps `ControllerError` onto the JSON error envelope of spec §6.1 in one
//! place, rather than matching on it at every handler (ground:
//! `adapters/mcp/tasks_http.rs`'s per-handler `(StatusCode, Json<_>)`
//! tuples, generalized into a single `IntoResponse` impl).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::domain::errors::ControllerError;
use crate::domain::models::ErrorResponse;

/// Wraps `ControllerError` so it can be returned directly from an axum
/// handler via `?`.
pub struct ApiError(pub ControllerError);

impl From<ControllerError> for ApiError {
    fn from(err: ControllerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, auth, id) = match &self.0 {
            ControllerError::Validation(_) => (StatusCode::BAD_REQUEST, None, None),
            ControllerError::Auth => (StatusCode::UNAUTHORIZED, Some(false), None),
            ControllerError::Upstream(_) => (StatusCode::BAD_REQUEST, None, None),
            ControllerError::Busy => (StatusCode::SERVICE_UNAVAILABLE, None, None),
            ControllerError::NotFound(id) => (StatusCode::NOT_FOUND, None, Some(id.clone())),
        };

        let body = ErrorResponse {
            success: false,
            code: status.as_u16(),
            error: self.0.to_string(),
            auth,
            id,
        };

        (status, Json(body)).into_response()
    }
}
