//! Error normalization: the only stage that writes failure bodies.

use axum::{
    body::HttpBody,
    extract::Request,
    http::{Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::middleware::context::RequestContext;
use crate::api::respond::respond;
use crate::error::{AppError, HandlerFailure};

/// Marks a response whose handler raised a shutdown error.
///
/// Read by [`super::context::layer`], which hands the reason to the
/// shutdown coordinator.
#[derive(Debug, Clone)]
pub struct ShutdownEscalation(pub String);

/// Replaces handler failures with their client-facing JSON body.
///
/// - request errors keep their status and message
/// - store, transport and shutdown errors become a generic `500`, with the
///   original error logged alongside method, path and trace id
/// - shutdown errors are additionally marked with [`ShutdownEscalation`]
/// - bare error statuses produced by inner layers (the `408` of the request
///   deadline, a `405` from the router) get a body naming the status; `404`
///   stays bodiless
pub async fn layer(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let ctx = match RequestContext::from_request(&req) {
        Ok(ctx) => ctx,
        Err(err) => return failure_response(&err, &method, &path, None),
    };

    let mut response = next.run(req).await;

    if let Some(HandlerFailure(err)) = response.extensions_mut().remove::<HandlerFailure>() {
        response = failure_response(&err, &method, &path, Some(ctx.trace_id()));
    } else if is_bare_error(&response) {
        let status = response.status();
        let message = status.canonical_reason().unwrap_or("Request failed");
        let err = AppError::request(message, status);
        let original = std::mem::replace(
            &mut response,
            failure_response(&err, &method, &path, Some(ctx.trace_id())),
        );
        for (name, value) in original.headers() {
            if name != header::CONTENT_LENGTH && !response.headers().contains_key(name) {
                response.headers_mut().insert(name.clone(), value.clone());
            }
        }
    }

    ctx.set_status(response.status());
    response
}

fn is_bare_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && status != StatusCode::NOT_FOUND
        && response.body().size_hint().exact() == Some(0)
}

/// Logs `err` and builds the response the client receives for it.
pub fn failure_response(
    err: &AppError,
    method: &Method,
    path: &str,
    trace_id: Option<Uuid>,
) -> Response {
    let trace_id = trace_id.map(|id| id.to_string()).unwrap_or_default();
    let status = err.status();

    if err.is_benign_transport() {
        tracing::debug!(error = %err, %method, %path, %trace_id, "client went away");
    } else if status.is_server_error() {
        tracing::error!(error = %err, %method, %path, %trace_id, "request failed");
    } else {
        tracing::warn!(
            error = %err,
            status = status.as_u16(),
            %method,
            %path,
            %trace_id,
            "request rejected"
        );
    }

    let mut response = respond(status, &err.error_response());

    if let AppError::Shutdown(reason) = err {
        response
            .extensions_mut()
            .insert(ShutdownEscalation(reason.clone()));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::context;
    use crate::domain::repositories::StoreError;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn seeded(router: Router) -> Router {
        router
            .layer(middleware::from_fn(layer))
            .layer(middleware::from_fn(|mut req: Request, next: Next| async move {
                let ctx = context::RequestContext::new(req.method(), req.uri().path());
                req.extensions_mut().insert(ctx);
                next.run(req).await
            }))
    }

    fn get_request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let app = seeded(Router::new().route("/ok", get(|| async { "fine" })));

        let response = app.oneshot(get_request("/ok")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_error_keeps_message() {
        let app = seeded(Router::new().route(
            "/bad",
            get(|| async {
                Err::<(), _>(AppError::bad_request("nope").with_field("kind", "spam"))
            }),
        ));

        let response = app.oneshot(get_request("/bad")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "nope", "fields": {"kind": "spam"}})
        );
    }

    #[tokio::test]
    async fn test_store_error_is_generic() {
        let app = seeded(Router::new().route(
            "/boom",
            get(|| async {
                Err::<(), AppError>(StoreError::Database(sqlx::Error::PoolTimedOut).into())
            }),
        ));

        let response = app.oneshot(get_request("/boom")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ShutdownEscalation>().is_none());
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Internal Server Error"})
        );
    }

    #[tokio::test]
    async fn test_shutdown_error_is_marked() {
        let app = seeded(Router::new().route(
            "/fatal",
            get(|| async { Err::<(), _>(AppError::shutdown("lock poisoned")) }),
        ));

        let response = app.oneshot(get_request("/fatal")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let marker = response.extensions().get::<ShutdownEscalation>().unwrap();
        assert_eq!(marker.0, "lock poisoned");
    }

    #[tokio::test]
    async fn test_missing_context_escalates() {
        let app = Router::new()
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(layer));

        let response = app.oneshot(get_request("/ok")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ShutdownEscalation>().is_some());
    }

    #[tokio::test]
    async fn test_bare_error_status_gets_json_body() {
        let app = seeded(Router::new().route(
            "/slow",
            get(|| async { StatusCode::REQUEST_TIMEOUT }),
        ));

        let response = app.oneshot(get_request("/slow")).await.unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Request Timeout"})
        );
    }

    #[tokio::test]
    async fn test_bare_error_status_keeps_headers() {
        let app = seeded(Router::new().route("/ok", get(|| async { "fine" })));
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/ok")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key(axum::http::header::ALLOW));
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Method Not Allowed"})
        );
    }

    #[tokio::test]
    async fn test_bare_not_found_stays_empty() {
        let app = seeded(Router::new().route("/ok", get(|| async { "fine" })));

        let response = app.oneshot(get_request("/missing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_with_body_is_kept() {
        let app = seeded(Router::new().route(
            "/teapot",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
        ));

        let response = app.oneshot(get_request("/teapot")).await.unwrap();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"short and stout");
    }

    #[test]
    fn test_benign_transport_is_not_escalated() {
        let err = AppError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));

        let response = failure_response(&err, &Method::GET, "/v1/domain/a", None);

        assert!(response.extensions().get::<ShutdownEscalation>().is_none());
    }
}
