//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::media_storage::StorageError;

/// JSON body returned for every failed request
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: msg.into(),
                code,
            },
        }
    }

    /// The multipart body had no `file` part
    #[must_use]
    pub fn no_file_uploaded() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "no_file", "No file uploaded")
    }

    /// A file part arrived under a field other than `file`
    #[must_use]
    pub fn unexpected_field() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "unexpected_field", "Unexpected field")
    }

    /// The uploaded file exceeds the size limit
    #[must_use]
    pub fn file_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "file_too_large", "File too large")
    }

    /// The MIME type cannot be mapped to a resource type
    #[must_use]
    pub fn unsupported_file_type() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "unsupported_file_type",
            "File type not supported",
        )
    }

    /// The delete route was called without a name
    #[must_use]
    pub fn no_file_name() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "no_file_name", "No file name provided")
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code of the error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.code,
                self.inner.error
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.code,
                self.inner.error
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert multipart decoding failures to application errors
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::file_too_large();
        }

        tracing::debug!("Multipart decoding failed: {}", err.body_text());
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_multipart",
            "Malformed multipart body",
        )
    }
}

/// Convert storage errors to application errors
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Storage provider error: {err}");

        // Only the vendor's own message reaches the client
        let message = match err {
            StorageError::Rejected { message, .. } => message,
            StorageError::NotFound(key) => format!("No such object: {key}"),
            _ => "Storage provider error".to_string(),
        };

        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "provider_error", message)
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
