//! Salon Academy API: error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use academy_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The catalog or backend client could not be set up.
    #[error("startup error: {0}")]
    Startup(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            DomainError::Unavailable(_) => (StatusCode::NOT_FOUND, "routine_unavailable"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => (StatusCode::BAD_GATEWAY, "infrastructure_error"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_session_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::SessionNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unavailable_maps_to_404() {
        assert_eq!(
            status_of(DomainError::Unavailable("no steps".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_maps_to_502() {
        assert_eq!(
            status_of(DomainError::Infrastructure("backend down".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
