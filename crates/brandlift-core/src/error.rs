//! Centralized error types for Brandlift.

use thiserror::Error;

use crate::profile::ValidationErrors;

/// Main error type for Brandlift operations.
#[derive(Error, Debug)]
pub enum BrandliftError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Result not found: {0}")]
    ResultNotFound(String),

    #[error("Invalid LLM response: {0}")]
    LlmResponse(String),

    #[error("Image generation unavailable: {0}")]
    ImagesUnavailable(String),

    #[error("Upstream provider error: {0}")]
    Upstream(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] brandlift_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for Brandlift operations.
pub type BrandliftResult<T> = Result<T, BrandliftError>;

impl BrandliftError {
    /// Create an LLM response error.
    pub fn llm_response(msg: impl Into<String>) -> Self {
        Self::LlmResponse(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

impl From<ValidationErrors> for BrandliftError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
