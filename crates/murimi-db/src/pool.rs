//! Connection pool setup.
//!
//! The registry serves a small field team, so the defaults size the pool for
//! a handful of concurrent dashboard and data-entry requests rather than bulk
//! traffic. Every knob can be overridden through `DB_*` environment variables;
//! unset or unparseable values fall back to the default.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use murimi_core::{Error, Result};

/// Pool sizing and timeout knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper bound on open connections (`DB_MAX_CONNECTIONS`).
    pub max_connections: u32,
    /// Connections kept warm between requests (`DB_MIN_CONNECTIONS`).
    pub min_connections: u32,
    /// How long a request waits for a free connection
    /// (`DB_ACQUIRE_TIMEOUT_SECS`).
    pub acquire_timeout: Duration,
    /// Idle connections are closed after this (`DB_IDLE_TIMEOUT_SECS`).
    pub idle_timeout: Duration,
    /// Connections are recycled after this (`DB_MAX_LIFETIME_SECS`).
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl PoolConfig {
    /// Read the pool configuration from `DB_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let setting = |name: &str| -> Option<u64> {
            let raw = lookup(name)?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(
                        subsystem = "db",
                        component = "pool",
                        var = name,
                        value = %raw,
                        "Ignoring unparseable pool setting"
                    );
                    None
                }
            }
        };

        Self {
            max_connections: setting("DB_MAX_CONNECTIONS")
                .map(|v| v as u32)
                .unwrap_or(defaults.max_connections),
            min_connections: setting("DB_MIN_CONNECTIONS")
                .map(|v| v as u32)
                .unwrap_or(defaults.min_connections),
            acquire_timeout: setting("DB_ACQUIRE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
            idle_timeout: setting("DB_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            max_lifetime: setting("DB_MAX_LIFETIME_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_lifetime),
        }
    }
}

/// Open a pool configured from the environment.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::from_env()).await
}

/// Open a pool with an explicit configuration.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        pool_size = pool.size(),
        pool_idle = pool.num_idle(),
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Database pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_registry_sized() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_env_overrides_apply() {
        let config = PoolConfig::from_lookup(|name| match name {
            "DB_MAX_CONNECTIONS" => Some("12".to_string()),
            "DB_ACQUIRE_TIMEOUT_SECS" => Some(" 30 ".to_string()),
            _ => None,
        });
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
        // Untouched knobs keep their defaults.
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.idle_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_unparseable_setting_falls_back_to_default() {
        let config = PoolConfig::from_lookup(|name| match name {
            "DB_MAX_CONNECTIONS" => Some("plenty".to_string()),
            "DB_MIN_CONNECTIONS" => Some("2".to_string()),
            _ => None,
        });
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.min_connections, 2);
    }
}
