//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use media::MediaError;
use serde_json::json;
use store::StoreError;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid or expired credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed to act on the resource
    #[error("Access forbidden: Insufficient permissions")]
    Forbidden,

    /// Bad request with message
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// Resource or one of its ancestors does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique key or reference conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A collaborator (object store) failed; the message is surfaced
    #[error("External dependency failed: {0}")]
    ExternalDependency(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::NotFound(format!("{} {}", entity, id)),
            StoreError::Conflict(msg) | StoreError::InUse(msg) => ApiError::Conflict(msg),
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            other => {
                error!("Store failure: {}", other);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedType(_)
            | MediaError::TooLarge { .. }
            | MediaError::InvalidFile(_) => ApiError::BadRequest(err.to_string()),
            MediaError::AlreadyExists(_) => ApiError::Conflict(err.to_string()),
            MediaError::Backend(msg) => ApiError::ExternalDependency(msg),
            MediaError::Io(e) => {
                error!("Media staging failure: {}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ExternalDependency(_) | ApiError::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
