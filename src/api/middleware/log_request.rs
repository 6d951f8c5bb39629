//! HTTP request/response logging middleware.

use axum::extract::Request;
use axum::response::Response;
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::api::middleware::context::RequestContext;

/// Trace layer whose span is the one seeded by [`super::context::layer`].
pub type RequestLogLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request) -> Span,
    fn(&Request, &Span),
    fn(&Response, Duration, &Span),
    tower_http::trace::DefaultOnBodyChunk,
    tower_http::trace::DefaultOnEos,
    (),
>;

/// Creates the request logging middleware.
///
/// # Logging Behavior
///
/// **On Request:** `INFO` "request started".
///
/// **On Response:** `INFO` "request finished" with the status code and the
/// elapsed time in microseconds, whatever the status.
///
/// Both lines are recorded inside the request span, so they carry the trace
/// id, method and path. Failures are logged by the error layer, not here.
///
/// # Example Logs
///
/// ```text
/// INFO request{trace_id=0b4c.. method=PUT path=/v1/events/a.com/bounced}: request started
/// INFO request{trace_id=0b4c.. method=PUT path=/v1/events/a.com/bounced}: request finished status=204 duration_us=87
/// ```
pub fn layer() -> RequestLogLayer {
    TraceLayer::new_for_http()
        .make_span_with(make_span as fn(&Request) -> Span)
        .on_request(on_request as fn(&Request, &Span))
        .on_response(on_response as fn(&Response, Duration, &Span))
        .on_failure(())
}

fn make_span(req: &Request) -> Span {
    match req.extensions().get::<RequestContext>() {
        Some(ctx) => ctx.span().clone(),
        None => tracing::info_span!(
            "request",
            trace_id = tracing::field::Empty,
            method = %req.method(),
            path = %req.uri().path(),
        ),
    }
}

fn on_request(_req: &Request, _span: &Span) {
    tracing::info!("request started");
}

fn on_response(response: &Response, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        duration_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX),
        "request finished"
    );
}
