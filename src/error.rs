use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::usuarios::validation::ValidationError;

/// Every failure a request can end in. Only `into_response` decides status
/// codes; the layers below just pick a variant.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("user {0} not found")]
    NotFound(Uuid),

    #[error("invalid user id: {0}")]
    InvalidId(String),

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateEmail(_)
            | ApiError::InvalidId(_)
            | ApiError::BadRequest(_)
            | ApiError::Storage(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(err) => json!(err),
            ApiError::DuplicateEmail(_) => json!({ "error": "email already registered" }),
            ApiError::NotFound(id) => json!({ "error": format!("user {} not found", id) }),
            ApiError::InvalidId(raw) => json!({ "error": format!("invalid user id: {}", raw) }),
            ApiError::BadRequest(msg) => json!({ "error": msg }),
            ApiError::Unauthorized(msg) => json!({ "error": msg }),
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage error");
                json!({ "error": e.to_string() })
            }
            ApiError::Hash(msg) => {
                tracing::error!(error = %msg, "password hashing failed");
                json!({ "error": "internal error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
