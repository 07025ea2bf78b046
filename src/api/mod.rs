//! The admission/lifecycle HTTP surface (C6): three routes behind one
//! `Arc<Controller>`, wired the way `adapters/mcp/tasks_http.rs` wires its
//! router — permissive CORS plus request tracing, both optional in shape but
//! always-on here since this controller has no untrusted-browser caveat the
//! teacher's MCP server worried about.

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controller::Controller;

pub fn router(controller: Arc<Controller>) -> Router {
    Router::new()
        .route("/run", post(handlers::run))
        .route("/stop", post(handlers::stop))
        .route("/status/{id}", get(handlers::status))
        .with_state(controller)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
