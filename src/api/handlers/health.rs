//! Handler for health check endpoint.

use axum::{extract::State, http::StatusCode, response::Response};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::api::respond::respond_object;
use crate::shutdown::ShutdownState;
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: Store unreachable or shutdown in progress
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Counter store reachable" },
///     "shutdown": { "status": "ok", "message": "Running" }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let store_check = check_store(&state).await;
    let shutdown_check = check_shutdown(&state);

    let all_healthy = store_check.is_ok() && shutdown_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store: store_check,
            shutdown: shutdown_check,
        },
    };

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    respond_object(status, &response)
}

async fn check_store(state: &AppState) -> CheckStatus {
    if state.events.store_healthy().await {
        CheckStatus::ok("Counter store reachable")
    } else {
        CheckStatus::error("Counter store unavailable")
    }
}

fn check_shutdown(state: &AppState) -> CheckStatus {
    match state.shutdown.state() {
        ShutdownState::Running => CheckStatus::ok("Running"),
        other => CheckStatus::error(format!("{other:?}")),
    }
}
