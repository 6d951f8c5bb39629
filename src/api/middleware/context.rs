//! Per-request context seeding, the outermost pipeline stage.

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};
use tracing::{Instrument, Span};
use uuid::Uuid;

use crate::api::middleware::errors::ShutdownEscalation;
use crate::error::AppError;
use crate::shutdown::ShutdownReason;
use crate::state::AppState;

#[derive(Debug)]
struct Values {
    trace_id: Uuid,
    started_at: DateTime<Utc>,
    start: Instant,
    span: Span,
    status: AtomicU16,
}

/// State carried by one request through the pipeline.
///
/// Created by [`layer`] and stored in the request extensions. Inner stages
/// read it through [`RequestContext::from_request`]; only the status cell is
/// written after the response is produced.
#[derive(Debug, Clone)]
pub struct RequestContext {
    values: Arc<Values>,
}

impl RequestContext {
    pub fn new(method: &Method, path: &str) -> Self {
        let trace_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "request",
            trace_id = %trace_id,
            method = %method,
            path = %path,
        );

        Self {
            values: Arc::new(Values {
                trace_id,
                started_at: Utc::now(),
                start: Instant::now(),
                span,
                status: AtomicU16::new(0),
            }),
        }
    }

    /// Fetches the context seeded for `req`.
    ///
    /// # Errors
    ///
    /// Returns a shutdown error when the context is missing: the pipeline
    /// was assembled without its seeding stage and cannot be trusted.
    pub fn from_request(req: &Request) -> Result<Self, AppError> {
        req.extensions()
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::shutdown("request context missing from pipeline"))
    }

    pub fn trace_id(&self) -> Uuid {
        self.values.trace_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.values.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.values.start.elapsed()
    }

    /// The span every log line of this request is recorded in.
    pub fn span(&self) -> &Span {
        &self.values.span
    }

    /// The final response status, once the error layer has settled it.
    pub fn status(&self) -> Option<StatusCode> {
        match self.values.status.load(Ordering::Acquire) {
            0 => None,
            code => StatusCode::from_u16(code).ok(),
        }
    }

    pub(crate) fn set_status(&self, status: StatusCode) {
        self.values.status.store(status.as_u16(), Ordering::Release);
    }
}

/// Seeds the [`RequestContext`] and forwards escalated shutdown errors.
///
/// This is the boundary shutdown errors escape to: if the response carries a
/// [`ShutdownEscalation`] the coordinator is asked to shut the process down.
pub async fn layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::new(req.method(), req.uri().path());
    req.extensions_mut().insert(ctx.clone());

    let response = next.run(req).instrument(ctx.span().clone()).await;

    if let Some(ShutdownEscalation(reason)) = response.extensions().get::<ShutdownEscalation>() {
        state
            .shutdown
            .request(ShutdownReason::Fatal(reason.clone()));
    }

    response
}
