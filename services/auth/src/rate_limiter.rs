//! Login rate limiter
//!
//! Counts login attempts per key (the normalized email). Once a key uses up
//! its attempts inside the window it is banned for the ban duration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Attempts allowed per window
    pub max_attempts: u32,
    pub window: Duration,
    pub ban_duration: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(5 * 60),
            ban_duration: Duration::from_secs(60 * 60),
        }
    }
}

/// Outcome of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Allowed,
    Banned { retry_after: Duration },
}

#[derive(Debug)]
struct Entry {
    attempts: u32,
    window_start: Instant,
    banned_until: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and decide whether it may proceed
    pub async fn attempt(&self, key: &str) -> Attempt {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(Entry {
            attempts: 0,
            window_start: now,
            banned_until: None,
        });

        if let Some(until) = entry.banned_until {
            if now < until {
                return Attempt::Banned {
                    retry_after: until - now,
                };
            }
            entry.banned_until = None;
            entry.attempts = 0;
            entry.window_start = now;
        }

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.attempts = 0;
            entry.window_start = now;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.banned_until = Some(now + self.config.ban_duration);
            warn!(
                "Banned login key {} for {} seconds",
                key,
                self.config.ban_duration.as_secs()
            );
            return Attempt::Banned {
                retry_after: self.config.ban_duration,
            };
        }

        entry.attempts += 1;
        Attempt::Allowed
    }

    /// Forget keys whose window and ban have both lapsed
    pub async fn prune(&self) {
        let now = Instant::now();
        let window = self.config.window;
        self.entries.lock().await.retain(|_, entry| {
            entry.banned_until.is_some_and(|until| now < until)
                || now.duration_since(entry.window_start) < window
        });
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window: Duration, ban_duration: Duration) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts: 5,
            window,
            ban_duration,
        })
    }

    #[tokio::test]
    async fn test_sixth_attempt_in_window_is_banned() {
        let limiter = RateLimiter::new(RateLimiterConfig::default());

        for _ in 0..5 {
            assert_eq!(limiter.attempt("a@b.com").await, Attempt::Allowed);
        }
        match limiter.attempt("a@b.com").await {
            Attempt::Banned { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(3600))
            }
            Attempt::Allowed => panic!("sixth attempt should be banned"),
        }

        // other keys are unaffected
        assert_eq!(limiter.attempt("c@d.com").await, Attempt::Allowed);
    }

    #[tokio::test]
    async fn test_attempts_reset_after_window() {
        let limiter = limiter(Duration::from_millis(50), Duration::from_secs(3600));

        for _ in 0..5 {
            limiter.attempt("a@b.com").await;
        }
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(limiter.attempt("a@b.com").await, Attempt::Allowed);
    }

    #[tokio::test]
    async fn test_ban_lifts_after_ban_duration() {
        let limiter = limiter(Duration::from_secs(300), Duration::from_millis(50));

        for _ in 0..6 {
            limiter.attempt("a@b.com").await;
        }
        assert!(matches!(
            limiter.attempt("a@b.com").await,
            Attempt::Banned { .. }
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(limiter.attempt("a@b.com").await, Attempt::Allowed);
    }

    #[tokio::test]
    async fn test_prune_drops_idle_keys() {
        let limiter = limiter(Duration::from_millis(20), Duration::from_millis(20));
        limiter.attempt("a@b.com").await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        limiter.prune().await;

        assert_eq!(limiter.tracked_keys().await, 0);
    }
}
