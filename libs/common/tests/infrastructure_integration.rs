//! Integration tests against live PostgreSQL and Redis servers
//!
//! Ignored by default; run with `cargo test -- --ignored` once `DATABASE_URL`
//! and `REDIS_URL` point at running servers.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
};
use std::time::Duration;

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_database_pool_is_healthy() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    assert!(health_check(&pool).await?, "Database health check failed");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_keys_expire_with_their_ttl() -> Result<(), Box<dyn std::error::Error>> {
    let redis = RedisPool::new(&RedisConfig::from_env()?)?;
    assert!(redis.health_check().await?, "Redis health check failed");

    let key = "integration_test:revoked_token";
    redis.set(key, "1", Some(1)).await?;
    assert!(redis.exists(key).await?);
    assert_eq!(redis.get(key).await?, Some("1".to_string()));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!redis.exists(key).await?, "key outlived its TTL");

    redis.set(key, "1", None).await?;
    redis.delete(key).await?;
    assert_eq!(redis.get(key).await?, None);
    Ok(())
}
