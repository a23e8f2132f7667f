//! Store error types

use thiserror::Error;

/// Errors returned by every `FitnessStore` implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed row does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A unique key would be duplicated
    #[error("{0}")]
    Conflict(String),

    /// The row is still referenced and cannot be deleted
    #[error("{0}")]
    InUse(String),

    /// The payload is well formed but violates a domain rule
    #[error("{0}")]
    Validation(String),

    /// Password hashing failed
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migrations could not be applied
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
