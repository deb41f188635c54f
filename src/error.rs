// src/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::repositories::RepositoryError;

#[derive(Debug)]
pub enum AppError {
    /// Unclassified store failure. Details are logged, never returned.
    Database(RepositoryError),
    NotFound(String),
    Validation { message: String, errors: Vec<FieldError> },
    /// A mutation was rejected because another record references the row.
    DatabaseIntegrity(String),
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation { message: msg.into(), errors: Vec::new() }
    }

    pub fn invalid_fields(errors: Vec<FieldError>) -> Self {
        AppError::Validation { message: "Validation failed".to_string(), errors }
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        AppError::DatabaseIntegrity(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DatabaseIntegrity(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let timestamp = Utc::now().to_rfc3339();

        let body = match self {
            AppError::Database(err) => {
                tracing::error!(error = %err, "Unhandled store failure");
                json!({
                    "timestamp": timestamp,
                    "status": status.as_u16(),
                    "error": "Database error occurred",
                })
            }
            AppError::Validation { message, errors } => json!({
                "timestamp": timestamp,
                "status": status.as_u16(),
                "error": message,
                "errors": errors,
            }),
            AppError::NotFound(msg) | AppError::DatabaseIntegrity(msg) | AppError::Internal(msg) => {
                json!({
                    "timestamp": timestamp,
                    "status": status.as_u16(),
                    "error": msg,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Database(err)
    }
}
