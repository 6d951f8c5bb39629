//! Handler for domain classification lookups.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::Response,
};

use crate::api::respond::respond;
use crate::error::AppError;
use crate::state::AppState;

/// Classifies a domain from the events recorded for it so far.
///
/// # Endpoint
///
/// `GET /v1/domain/{domain}`
///
/// # Response
///
/// A JSON string: `"catch-all"`, `"not catch-all"` or `"unknown"`.
/// Domains never seen before are `"unknown"`, not `404`.
///
/// # Errors
///
/// Returns 400 if the domain segment is not valid percent-encoded UTF-8.
/// Returns 500 if the counter store cannot be read.
pub async fn classify_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(domain) = path?;
    let classification = state.events.lookup(&domain).await?;

    Ok(respond(StatusCode::OK, &classification))
}
