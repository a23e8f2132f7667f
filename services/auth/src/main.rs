use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod rate_limiter;
mod revocation;
mod routes;
mod state;


use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool},
    jwt::{JwtConfig, JwtService},
};
use store::{FitnessStore, MemoryStore, PgStore};
use tokio::net::TcpListener;

use crate::{
    config::{RevocationBackend, ServerConfig, StorageBackend},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    revocation::{MemoryRevocationList, RedisRevocationList, RevocationList},
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

    info!("Starting authentication service");

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
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    let revocations: Arc<dyn RevocationList> = match config.revocation {
        RevocationBackend::Redis => {
            let redis_pool = RedisPool::new(&RedisConfig::from_env()?)?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            Arc::new(RedisRevocationList::new(redis_pool))
        }
        RevocationBackend::Memory => Arc::new(MemoryRevocationList::new()),
    };

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let rate_limiter = RateLimiter::new(RateLimiterConfig {
        max_attempts: config.login_max_attempts,
        window: Duration::from_secs(config.login_window_seconds),
        ban_duration: Duration::from_secs(config.login_ban_seconds),
    });

    let pruner = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            pruner.prune().await;
        }
    });

    let app_state = AppState {
        store,
        jwt_service,
        revocations,
        rate_limiter,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Authentication service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
