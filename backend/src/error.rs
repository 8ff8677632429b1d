//! Error handling for the Cafe Inventory Platform
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::StockError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Stock errors
    #[error(transparent)]
    Stock(#[from] StockError),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("body".to_string(), "Invalid request".to_string()));
        AppError::Validation { field, message }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }
}

fn stock_error_detail(err: &StockError) -> (StatusCode, ErrorDetail) {
    let message = err.to_string();
    match err {
        StockError::UnknownUnit(_) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail {
                field: Some("unit".to_string()),
                ..ErrorDetail::new("UNKNOWN_UNIT", message)
            },
        ),
        StockError::IncompatibleUnit { .. } => (
            StatusCode::BAD_REQUEST,
            ErrorDetail {
                field: Some("unit".to_string()),
                ..ErrorDetail::new("INCOMPATIBLE_UNIT", message)
            },
        ),
        StockError::InvalidAmount(_) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("INVALID_AMOUNT", message),
        ),
        StockError::InvalidChangeAmount(_) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail {
                field: Some("amount".to_string()),
                ..ErrorDetail::new("INVALID_CHANGE_AMOUNT", message)
            },
        ),
        StockError::InsufficientStock {
            available,
            requested,
            ..
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorDetail {
                details: Some(serde_json::json!({
                    "available": available,
                    "requested": requested,
                })),
                ..ErrorDetail::new("INSUFFICIENT_STOCK", message)
            },
        ),
        StockError::PartialBatchFailure { missing, .. } => (
            StatusCode::CONFLICT,
            ErrorDetail {
                details: Some(serde_json::json!({ "missing": missing })),
                ..ErrorDetail::new("PARTIAL_BATCH_FAILURE", message)
            },
        ),
        StockError::InvalidOrderState { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorDetail::new("INVALID_ORDER_STATE", message),
        ),
        StockError::InvalidUnitDefinition { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorDetail::new("CONFIGURATION_ERROR", message),
        ),
        StockError::InvalidTimestamp(_) | StockError::InvalidDateRange { .. } => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("INVALID_DATE", message),
        ),
        StockError::IngredientNotFound(_) => (
            StatusCode::NOT_FOUND,
            ErrorDetail::new("NOT_FOUND", message),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::Stock(err) => stock_error_detail(err),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("EXTERNAL_SERVICE_ERROR", format!("External service error: {}", msg)),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        // Rejected stock changes are expected outcomes, not faults
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
