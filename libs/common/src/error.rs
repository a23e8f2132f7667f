//! Custom error types for the common library
//!
//! This module defines infrastructure error types shared by the services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised while issuing or validating tokens
#[derive(Error, Debug)]
pub enum TokenError {
    /// Key material is missing or malformed
    #[error("JWT configuration error: {0}")]
    Configuration(String),

    /// The service was built for validation only
    #[error("Token issuance is not configured for this service")]
    IssuanceDisabled,

    /// Signature, expiry or structure check failed
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// A token of the wrong kind was presented
    #[error("Expected a {expected} token")]
    WrongType { expected: &'static str },

    /// Clock error while computing timestamps
    #[error("Failed to get current time: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

/// Type alias for Result with TokenError
pub type TokenResult<T> = Result<T, TokenError>;
