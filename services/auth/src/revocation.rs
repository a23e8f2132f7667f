//! Revoked refresh tokens
//!
//! Entries are keyed by token ID (`jti`) and live exactly as long as the
//! token they revoke would have.

use anyhow::Result;
use async_trait::async_trait;
use common::cache::RedisPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[async_trait]
pub trait RevocationList: Send + Sync + 'static {
    /// Revoke a token ID for `ttl_seconds`
    async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> Result<()>;

    async fn is_revoked(&self, token_id: &str) -> Result<bool>;
}

/// Redis-backed revocation list shared by every service instance
#[derive(Clone)]
pub struct RedisRevocationList {
    redis: RedisPool,
}

impl RedisRevocationList {
    pub fn new(redis: RedisPool) -> Self {
        Self { redis }
    }

    fn key(token_id: &str) -> String {
        format!("revoked_token:{}", token_id)
    }
}

#[async_trait]
impl RevocationList for RedisRevocationList {
    async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> Result<()> {
        self.redis
            .set(&Self::key(token_id), "1", Some(ttl_seconds))
            .await
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        self.redis.exists(&Self::key(token_id)).await
    }
}

/// Process-local revocation list for tests and single-instance development
#[derive(Debug, Clone, Default)]
pub struct MemoryRevocationList {
    entries: Arc<Mutex<HashMap<String, Instant>>>,
}

impl MemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationList for MemoryRevocationList {
    async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> Result<()> {
        let expires = Instant::now() + Duration::from_secs(ttl_seconds.max(1));
        let mut entries = self.entries.lock().await;
        entries.retain(|_, until| *until > Instant::now());
        entries.insert(token_id.to_string(), expires);
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(token_id)
            .is_some_and(|until| *until > Instant::now()))
    }
}
