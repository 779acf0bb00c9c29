//! Route handlers.

pub mod analyze;
pub mod form;
pub mod health;
pub mod images;
pub mod results;

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use brandlift_core::BrandliftError;
use serde_json::json;

/// JSON request body whose rejections are reported as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Error returned by JSON handlers.
#[derive(Debug)]
pub struct ApiError(pub BrandliftError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BrandliftError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BrandliftError::ResultNotFound(_) => StatusCode::NOT_FOUND,
            BrandliftError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BrandliftError::ImagesUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BrandliftError::Upstream(_) | BrandliftError::LlmResponse(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BrandliftError> for ApiError {
    fn from(err: BrandliftError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(BrandliftError::invalid_request(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            BrandliftError::Validation(errors) => json!({
                "error": "validation_failed",
                "message": "Some answers need attention",
                "errors": errors.errors,
            }),
            other => {
                if status.is_server_error() {
                    tracing::error!(status = status.as_u16(), error = %other, "Request failed");
                }
                json!({ "error": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
