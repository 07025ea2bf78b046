//! HTTP handlers for the three admission/lifecycle endpoints of spec §6.1.
//! Each checks the bearer token first, then delegates to `Controller`.
//! Grounded on `adapters/mcp/tasks_http.rs`'s handler shape (state extractor,
//! `Json` in, `impl IntoResponse` out), generalized to the token-in-body
//! auth model of `original_source/manager/auth.go`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};

use crate::api::auth::check_token;
use crate::api::error::ApiError;
use crate::controller::Controller;
use crate::domain::models::{RunRequest, StatusRequest, StopRequest, SuccessResponse};

pub async fn run(
    State(controller): State<Arc<Controller>>,
    Json(request): Json<RunRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_token(controller.token(), &request.token)?;
    let id = controller.run(request).await?;
    Ok(Json(SuccessResponse::new(id)))
}

pub async fn stop(
    State(controller): State<Arc<Controller>>,
    Json(request): Json<StopRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_token(controller.token(), &request.token)?;
    controller.stop(&request.id).await?;
    Ok(Json(SuccessResponse::new(request.id)))
}

pub async fn status(
    State(controller): State<Arc<Controller>>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_token(controller.token(), &request.token)?;
    let result = controller.status(&id).await?;
    Ok(Json(SuccessResponse::with_status(result.id, result.status)))
}
