use crate::database::{is_foreign_key_violation, is_unique_violation};
use crate::pagination::PaginationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by the resource endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("{0}")]
    Pagination(#[from] PaginationError),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl ApiError {
    /// Classifies a repository failure. Constraint violations become client errors.
    pub fn from_repository(err: anyhow::Error) -> Self {
        if is_unique_violation(&err) {
            ApiError::Conflict("a record with the same unique value already exists".to_string())
        } else if is_foreign_key_violation(&err) {
            ApiError::Unprocessable("referenced record does not exist".to_string())
        } else {
            error!("Repository error: {:?}", err);
            ApiError::Database(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, mut body) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Resource not found" })),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "details": errors }),
            ),
            ApiError::Pagination(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": msg })),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        body["status"] = json!(status.as_u16());
        (status, Json(body)).into_response()
    }
}
