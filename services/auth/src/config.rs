//! Authentication service settings, read from `AUTH_*` environment variables

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub storage: StorageBackend,
    pub revocation: RevocationBackend,
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
    pub login_ban_seconds: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("storage", "postgres")?
            .set_default("revocation", "redis")?
            .set_default("login_max_attempts", 5)?
            .set_default("login_window_seconds", 300)?
            .set_default("login_ban_seconds", 3600)?
            .add_source(config::Environment::with_prefix("AUTH"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        unsafe {
            std::env::remove_var("AUTH_STORAGE");
            std::env::remove_var("AUTH_REVOCATION");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.revocation, RevocationBackend::Redis);
        assert_eq!(config.login_max_attempts, 5);
    }

    #[test]
    #[serial]
    fn test_memory_backends() {
        unsafe {
            std::env::set_var("AUTH_STORAGE", "memory");
            std::env::set_var("AUTH_REVOCATION", "memory");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.revocation, RevocationBackend::Memory);

        unsafe {
            std::env::remove_var("AUTH_STORAGE");
            std::env::remove_var("AUTH_REVOCATION");
        }
    }
}
