//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health` - Health check: counter store, shutdown state
//! - `/v1/*`        - Classification and event ingestion
//!
//! # Middleware
//!
//! Every route runs through the request pipeline, outermost first:
//!
//! 1. **Context** - per-request trace id, span and start time
//! 2. **Logging** - "request started" / "request finished"
//! 3. **Errors** - handler failures become JSON error bodies
//! 4. **Timeout** - `408` once the request deadline passes
//!
//! Request bodies (read by handlers) and response bodies (written after the
//! error stage) are bounded by the read and write timeouts: a peer that
//! stalls mid-body fails the request.
//!
//! Trailing slashes are trimmed before routing.

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{context, errors, log_request};
use crate::config::HttpTimeouts;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::timeout::{RequestBodyTimeoutLayer, ResponseBodyTimeoutLayer, TimeoutLayer};

/// Builds the routes with the full request pipeline attached.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `timeouts` - request deadline and body read/write deadlines
pub fn build_router(state: AppState, timeouts: HttpTimeouts) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api::routes::v1_routes())
        .layer(RequestBodyTimeoutLayer::new(timeouts.read))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeouts.request,
        ))
        .layer(middleware::from_fn(errors::layer))
        .layer(ResponseBodyTimeoutLayer::new(timeouts.write))
        .layer(log_request::layer())
        .layer(middleware::from_fn_with_state(state.clone(), context::layer))
        .with_state(state)
}

/// Constructs the application service served on the listener.
pub fn app_router(state: AppState, timeouts: HttpTimeouts) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, timeouts))
}
