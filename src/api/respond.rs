//! JSON response writer used by handlers and the error layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::ErrorResponse;

/// Serializes `data` as the JSON body of a response with `status`.
///
/// - `204 No Content` and `404 Not Found` never carry a body.
/// - `201 Created` carries no body when `data` serializes to `null`.
/// - Any other `null` payload is written as `[]`, so clients never have to
///   special-case a missing collection.
pub fn respond<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Response {
    write(status, data, Value::Array(Vec::new()))
}

/// Like [`respond`], but a `null` payload is written as `{}`.
///
/// Use for payloads that are mappings rather than collections.
pub fn respond_object<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Response {
    write(status, data, Value::Object(serde_json::Map::new()))
}

/// `204 No Content` with an empty body.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn write<T: Serialize + ?Sized>(status: StatusCode, data: &T, empty: Value) -> Response {
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
        return status.into_response();
    }

    let value = match serde_json::to_value(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response payload");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal()),
            )
                .into_response();
        }
    };

    match value {
        Value::Null if status == StatusCode::CREATED => status.into_response(),
        Value::Null => (status, Json(empty)).into_response(),
        value => (status, Json(value)).into_response(),
    }
}
