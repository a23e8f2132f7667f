use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod extract;
mod handlers;
mod middleware;
mod policy;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use common::{
    database::{DatabaseConfig, init_pool},
    jwt::{JwtConfig, JwtService},
};
use media::{MediaService, MemoryObjectStore, ObjectStore, S3Config, S3ObjectStore};
use store::{FitnessStore, MemoryStore, PgStore};
use tokio::net::TcpListener;

use crate::{
    config::{MediaBackend, ServerConfig, StorageBackend},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn FitnessStore> = match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if common::database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            let store = PgStore::new(pool);
            store.migrate().await?;
            info!("Database migrations applied");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let object_store: Arc<dyn ObjectStore> = match config.media {
        MediaBackend::S3 => {
            let mut s3_config = S3Config::new(config.s3_bucket.clone());
            s3_config.endpoint = config.s3_endpoint.clone();
            s3_config.public_base_url = config.public_base_url.clone();
            Arc::new(S3ObjectStore::new(s3_config).await)
        }
        MediaBackend::Memory => Arc::new(MemoryObjectStore::new()),
    };

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let app_state = AppState {
        store,
        media: MediaService::new(object_store, config.media_config()),
        jwt_service,
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("API service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
