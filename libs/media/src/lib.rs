//! Media delegation for the FitJourney backend
//!
//! Binary uploads (profile pictures, exercise images and videos) are handed
//! to an external object store; entities only persist the returned reference
//! URL.
//!
//! - [`ObjectStore`]: folder-aware object storage contract
//! - [`S3ObjectStore`]: AWS S3 (folders are key prefixes)
//! - [`MemoryObjectStore`]: in-process store for tests
//! - [`MediaService`]: validation, staging, upload and release

pub mod error;
pub mod memory;
pub mod s3;
pub mod service;
pub mod storage;
pub mod validation;

pub use error::{MediaError, MediaResult};
pub use memory::MemoryObjectStore;
pub use s3::{S3Config, S3ObjectStore};
pub use service::{MediaConfig, MediaOwner, MediaService, MediaSource};
pub use storage::{Deletion, ObjectStore, RemoteFile, RemoteRef};
