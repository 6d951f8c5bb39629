//! Request-handling error taxonomy.
//!
//! Handlers return [`AppError`] instead of writing failure responses. Turning
//! an error into a response body is left to
//! [`crate::api::middleware::errors`], the only place that decides what the
//! client sees.

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::repositories::StoreError;

/// JSON body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }

    /// The body sent for any error whose details must stay server-side.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR
                .canonical_reason()
                .unwrap_or("Internal Server Error"),
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// An expected failure with a client-visible message and status.
    #[error("{message}")]
    Request {
        message: String,
        status: StatusCode,
        fields: Option<BTreeMap<String, String>>,
    },

    /// The counter store failed. Details are logged, never sent to the client.
    #[error("store failure: {0}")]
    Store(#[source] StoreError),

    /// Reading from or writing to the peer connection failed.
    ///
    /// Axum drops the handler future when a client disconnects, so the
    /// routes in this crate never produce it; connection-level failures
    /// (including idle timeouts) end inside hyper, which closes the socket.
    /// Handlers that do their own socket IO report failures through it.
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),

    /// The process must begin graceful termination.
    #[error("shutdown requested: {0}")]
    Shutdown(String),
}

impl AppError {
    pub fn request(message: impl Into<String>, status: StatusCode) -> Self {
        Self::Request {
            message: message.into(),
            status,
            fields: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::request(message, StatusCode::BAD_REQUEST)
    }

    pub fn shutdown(reason: impl Into<String>) -> Self {
        Self::Shutdown(reason.into())
    }

    /// Attaches a field-level detail. Has no effect on non-request errors.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Request { fields, .. } = &mut self {
            fields
                .get_or_insert_with(BTreeMap::new)
                .insert(key.into(), value.into());
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Request { status, .. } => *status,
            Self::Store(_) | Self::Transport(_) | Self::Shutdown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The body the client receives for this error.
    pub fn error_response(&self) -> ErrorResponse {
        match self {
            Self::Request {
                message, fields, ..
            } => ErrorResponse {
                error: message.clone(),
                fields: fields.clone(),
            },
            _ => ErrorResponse::internal(),
        }
    }

    /// Only shutdown errors escape the request pipeline.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown(_))
    }

    /// Peer disconnects while reading or writing: expected, never fatal.
    pub fn is_benign_transport(&self) -> bool {
        match self {
            Self::Transport(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownEventKind(kind) => {
                AppError::bad_request(format!("unknown event kind: {kind}"))
                    .with_field("kind", kind)
            }
            StoreError::Poisoned => {
                AppError::shutdown("counter store integrity lost: lock poisoned")
            }
            err @ StoreError::Database(_) => AppError::Store(err),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::request(rejection.body_text(), rejection.status())
    }
}

/// A handler error carried on its response until the error layer handles it.
#[derive(Debug, Clone)]
pub struct HandlerFailure(pub Arc<AppError>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response
            .extensions_mut()
            .insert(HandlerFailure(Arc::new(self)));
        response
    }
}
