use super::RestState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use docket_documents::DocumentService;
use docket_kernel::domain::Document;
use docket_kernel::domain::constants::POST_DOCUMENT_SCHEMA;
use docket_kernel::ports::SchemaValidator;
use docket_kernel::{Error, ErrorKind};
use std::sync::Arc;
use tracing::{debug, error};

const INTERNAL_BODY: &str = "Internal Server Error";

/// A failed request: the status to answer with and the error behind it.
///
/// Client errors echo the error message as plain text. Server errors only log it.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: Error,
}

impl ApiError {
    /// Maps the chain's classification: `NotFound` → 404, `BadRequest` → 400, else 500.
    #[must_use]
    pub fn classified(error: Error) -> Self {
        let status = if error.is(ErrorKind::NotFound) {
            StatusCode::NOT_FOUND
        } else if error.is(ErrorKind::BadRequest) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, error }
    }

    /// `BadRequest` → 400, anything else → 500.
    #[must_use]
    pub fn bad_request_or_internal(error: Error) -> Self {
        let status = if error.is(ErrorKind::BadRequest) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, error }
    }

    #[must_use]
    pub const fn internal(error: Error) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, error }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.error, "Request failed");
            return (self.status, INTERNAL_BODY).into_response();
        }

        debug!(status = %self.status, error = %self.error, "Request rejected");
        (self.status, self.error.to_string()).into_response()
    }
}

pub(super) async fn get_document<D, V>(
    State(state): State<Arc<RestState<D, V>>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    D: DocumentService,
    V: SchemaValidator,
{
    let document = state.domain.get_document(&id).await.map_err(ApiError::classified)?;

    let body = serde_json::to_vec(&document).map_err(|e| {
        ApiError::internal(Error::wrap_as(ErrorKind::Internal, e, "failed to encode document"))
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub(super) async fn post_document<D, V>(
    State(state): State<Arc<RestState<D, V>>>,
    body: Bytes,
) -> Result<String, ApiError>
where
    D: DocumentService,
    V: SchemaValidator,
{
    state
        .validator
        .validate(POST_DOCUMENT_SCHEMA, &body)
        .map_err(ApiError::bad_request_or_internal)?;

    let document: Document = serde_json::from_slice(&body).map_err(|e| {
        ApiError::classified(Error::wrap_as(ErrorKind::BadRequest, e, "failed to decode document"))
    })?;

    let id = state.domain.add_document(document).await.map_err(ApiError::internal)?;
    debug!(%id, "Document created");
    Ok(id)
}
