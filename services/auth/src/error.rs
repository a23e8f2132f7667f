//! Error type for the authentication service

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use common::error::TokenError;
use serde_json::json;
use store::StoreError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// Wrong password, or a missing, invalid, expired or revoked token
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access forbidden: Insufficient permissions")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many login attempts, retry in {retry_after} seconds")]
    TooManyRequests { retry_after: u64 },

    #[error("Internal server error")]
    InternalServerError,
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AuthError::NotFound(format!("{} {}", entity, id)),
            StoreError::Conflict(msg) | StoreError::InUse(msg) => AuthError::Conflict(msg),
            StoreError::Validation(msg) => AuthError::BadRequest(msg),
            other => {
                error!("Store failure: {}", other);
                AuthError::InternalServerError
            }
        }
    }
}

/// Validation failures are mapped to `Unauthorized` at the call site; what
/// reaches this conversion is an issuance or clock failure
impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        error!("Token service failure: {}", err);
        AuthError::InternalServerError
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        error!("Revocation list failure: {}", err);
        AuthError::InternalServerError
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        let mut response = (status, body).into_response();
        if let AuthError::TooManyRequests { retry_after } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
