//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use fleetdesk_core::error::{AppError, ErrorKind};

/// Message sent to the client in place of any backend failure.
pub const GENERIC_SERVER_ERROR: &str = "Something went wrong. Please try again.";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Per-field validation messages and other structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP status and error code for an error kind.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
        ErrorKind::Authorization => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::Integrity => (StatusCode::CONFLICT, "INTEGRITY_ERROR"),
        ErrorKind::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Cache
        | ErrorKind::Storage
        | ErrorKind::Configuration
        | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl From<AppError> for ApiErrorResponse {
    fn from(err: AppError) -> Self {
        let (_, code) = status_for(err.kind);
        if err.is_server_error() {
            return Self {
                success: false,
                error: code.to_string(),
                message: GENERIC_SERVER_ERROR.to_string(),
                details: None,
            };
        }
        Self {
            success: false,
            error: code.to_string(),
            message: err.message,
            details: err.details,
        }
    }
}

/// Newtype so the orphan rule lets us implement `IntoResponse` here.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, _) = status_for(err.kind);

        if err.is_server_error() {
            match std::error::Error::source(&err) {
                Some(source) => tracing::error!(
                    kind = %err.kind,
                    error = %err.message,
                    source = %source,
                    "Request failed"
                ),
                None => tracing::error!(kind = %err.kind, error = %err.message, "Request failed"),
            }
        }

        (status, Json(ApiErrorResponse::from(err))).into_response()
    }
}

/// Result type returned by every handler.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_keeps_field_details() {
        let body = ApiErrorResponse::from(AppError::invalid_field("slug", "Slug is taken"));
        assert_eq!(body.error, "VALIDATION_ERROR");
        assert_eq!(body.details.unwrap()["slug"][0], "Slug is taken");
        assert!(!body.success);
    }

    #[test]
    fn test_server_errors_are_masked() {
        let body = ApiErrorResponse::from(AppError::database("relation \"bookings\" missing"));
        assert_eq!(body.message, GENERIC_SERVER_ERROR);
        assert!(body.details.is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Integrity).0, StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Authorization).0, StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Authentication).0, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Validation).0, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::Storage).0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
