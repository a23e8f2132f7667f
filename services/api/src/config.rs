//! API service settings
//!
//! Read from `API_*` environment variables (for example
//! `API_BIND_ADDRESS`, `API_STORAGE`, `API_MEDIA`, `API_S3_BUCKET`) over the
//! defaults below.

use media::{MediaConfig, validation::DEFAULT_MAX_UPLOAD_BYTES};
use serde::Deserialize;
use std::path::PathBuf;

/// Persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Object store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub storage: StorageBackend,
    pub media: MediaBackend,
    pub s3_bucket: String,
    pub s3_endpoint: Option<String>,
    pub public_base_url: Option<String>,
    pub root_folder: String,
    pub staging_dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let staging_dir = std::env::temp_dir().join("fitjourney-staging");

        config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("storage", "postgres")?
            .set_default("media", "s3")?
            .set_default("s3_bucket", "fitjourney-media")?
            .set_default("root_folder", "FitJourney")?
            .set_default("staging_dir", staging_dir.to_string_lossy().to_string())?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES)?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    pub fn media_config(&self) -> MediaConfig {
        MediaConfig {
            root_folder: self.root_folder.clone(),
            staging_dir: self.staging_dir.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
