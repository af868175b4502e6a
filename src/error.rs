//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("{0}")]
    Validation(String),

    #[error("Consumer not found")]
    ConsumerNotFound,

    #[error("Not found")]
    BillNotFound,

    #[error("Consumer already exists")]
    DuplicateConsumer,

    #[error("Bill already exists for month/year")]
    DuplicateBill,

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body, `{ "error": "..." }` on the wire.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            // 400 Bad Request - client-correctable, never logged as a fault
            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::ConsumerNotFound | AppError::BillNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::DuplicateConsumer | AppError::DuplicateBill => StatusCode::CONFLICT,

            // 500 Internal Server Error - unexpected, logged server-side
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse { error: message };

        (status, Json(body)).into_response()
    }
}
