use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::AdapterError;
use crate::parser::ParseError;
use crate::storage::StorageError;

/// Malformed artifacts handed from one pipeline stage to the next.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationInputError {
    #[error("analysis references unknown knowledge domain '{0}'")]
    UnknownDomain(String),

    #[error("question '{0}' is not part of this analysis")]
    UnknownQuestion(String),

    #[error("proposal has no sections")]
    EmptyProposal,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Input(#[from] ValidationInputError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Parse(e @ ParseError::UnsupportedFormat(_)) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                e.to_string(),
            ),
            AppError::Parse(e @ ParseError::Extraction(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
            ),
            AppError::Input(e) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string()),
            AppError::Adapter(e @ AdapterError::Unavailable(_)) => {
                tracing::warn!("Text generation unavailable: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ADAPTER_UNAVAILABLE",
                    "Text generation is not configured".to_string(),
                )
            }
            AppError::Adapter(e) => {
                tracing::error!("Text generation error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ADAPTER_ERROR",
                    "The text generation service failed".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
