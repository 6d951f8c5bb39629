//! API route configuration.

use crate::api::handlers::{classify_handler, record_event_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

/// Versioned API routes, nested under `/v1`.
///
/// # Endpoints
///
/// - `GET /domain/{domain}`        - Classify a domain
/// - `PUT /events/{domain}/{kind}` - Record a `delivered` or `bounced` event
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/domain/{domain}", get(classify_handler))
        .route("/events/{domain}/{kind}", put(record_event_handler))
}
