use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::application::dto::ErrorResponse;
use crate::domain::errors::DomainError;

/// Any failure on the request path. Always rendered as the
/// `{"success": false, "error": ...}` envelope with a 500 status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("malformed request body: {0}")]
    Payload(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!("request failed: {}", message);
        let body = ErrorResponse { success: false, error: message };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
