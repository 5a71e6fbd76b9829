use super::RestState;
use super::handlers;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use docket_documents::DocumentService;
use docket_kernel::ports::SchemaValidator;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Document routes with request tracing and a per-request `timeout`.
///
/// Requests still running after `timeout` are answered with `504 Gateway Timeout`.
pub fn router<D, V>(state: Arc<RestState<D, V>>, timeout: Duration) -> Router
where
    D: DocumentService,
    V: SchemaValidator,
{
    Router::new()
        .route("/documents", post(handlers::post_document::<D, V>))
        .route("/documents/{id}", get(handlers::get_document::<D, V>))
        .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
