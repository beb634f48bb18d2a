use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use librakeeper_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self.0 {
            AppError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            AppError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            // Everything else comes from the searcher or the way to it.
            _ => (StatusCode::BAD_GATEWAY, "upstream_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Search request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.0.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
