//! Handler for delivery event ingestion.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    response::Response,
};

use crate::api::respond::no_content;
use crate::error::AppError;
use crate::state::AppState;

/// Records one delivery outcome for a domain.
///
/// # Endpoint
///
/// `PUT /v1/events/{domain}/{kind}` where `kind` is `delivered` or `bounced`
///
/// Returns `204 No Content` on success.
///
/// # Errors
///
/// Returns 400 for any other `kind`, or for path segments that are not
/// valid percent-encoded UTF-8, without touching the counters.
/// Returns 500 if the counter store cannot be written.
pub async fn record_event_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, AppError> {
    let Path((domain, kind)) = path?;
    state.events.record_outcome_str(&domain, &kind).await?;

    Ok(no_content())
}
