//! Common library for the FitJourney backend
//!
//! This crate provides shared infrastructure used by the API and
//! authentication services: PostgreSQL pooling, the Redis client used for
//! token revocation, and the JWT service that issues and validates identity
//! tokens.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     println!("Database reachable: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod jwt;
