//! API error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use validator::ValidationErrors;

use catalog_core::error::DomainError;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-keyed validation failures, surfaced distinctly from generic
    /// errors.
    #[error("Validation failed")]
    Validation(Value),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Validation error attached to a single field.
    pub fn field(field: &str, message: &str) -> Self {
        ApiError::Validation(json!({ field: [message] }))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ProductNotFound | DomainError::ProductNotFoundById(_) => {
                ApiError::NotFound("Product not found".to_string())
            }
            DomainError::CategoryNotFound => ApiError::NotFound("Category not found".to_string()),
            DomainError::CategoryNameAlreadyExists(name) => {
                ApiError::field("name", &format!("category '{}' already exists", name))
            }
            DomainError::ValidationError(msg) => ApiError::Validation(json!({ "detail": [msg] })),
            DomainError::DatabaseError(msg) => ApiError::DatabaseError(msg),
            DomainError::StorageError(msg) | DomainError::QueueError(msg) => {
                ApiError::InternalError(msg)
            }
            DomainError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let map: Value = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), json!(messages))
            })
            .collect::<serde_json::Map<String, Value>>()
            .into();
        ApiError::Validation(map)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, json!({ "detail": [msg] }))
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, json!({ "detail": [msg] }))
            }
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, errors),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": ["internal server error"] }),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": ["internal server error"] }),
                )
            }
        };

        (status, Json(ApiResponse::failure(errors))).into_response()
    }
}
