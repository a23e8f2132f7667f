//! Entity store for the FitJourney backend
//!
//! Defines the fitness entities (users, roles, plans, days, workout sessions,
//! exercises, custom exercises, records), the [`FitnessStore`] trait that
//! persists them, and two implementations:
//!
//! - [`PgStore`]: PostgreSQL with embedded migrations
//! - [`MemoryStore`]: in-process tables for tests and local development

pub mod error;
pub mod memory;
pub mod models;
pub mod numeric;
pub mod password;
pub mod postgres;
pub mod traits;
pub mod validation;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use traits::FitnessStore;
