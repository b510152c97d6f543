//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Moderation workflow configuration.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Rental service configuration.
    pub rental: RentalConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis channels.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

/// Moderation workflow configuration: lock TTL, escalation window, and the
/// intervals of the two background sweeps.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// How long a moderator's claim on a report stays valid without a
    /// refresh.
    #[serde(default = "default_lock_ttl_minutes")]
    pub lock_ttl_minutes: u32,
    /// How long an OVERDUE report may stay PENDING before it is escalated.
    #[serde(default = "default_escalation_window_hours")]
    pub escalation_window_hours: u32,
    /// Interval of the expired-lock reaper sweep.
    #[serde(default = "default_reaper_interval_minutes")]
    pub reaper_interval_minutes: u32,
    /// Interval of the escalation sweep.
    #[serde(default = "default_escalation_interval_hours")]
    pub escalation_interval_hours: u32,
}

impl ModerationConfig {
    /// Lock TTL as a duration.
    #[must_use]
    pub fn lock_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.lock_ttl_minutes))
    }

    /// Escalation window as a duration.
    #[must_use]
    pub fn escalation_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.escalation_window_hours))
    }

    /// Reaper sweep interval as a duration.
    #[must_use]
    pub fn reaper_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.reaper_interval_minutes) * 60)
    }

    /// Escalation sweep interval as a duration.
    #[must_use]
    pub fn escalation_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.escalation_interval_hours) * 3600)
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            lock_ttl_minutes: default_lock_ttl_minutes(),
            escalation_window_hours: default_escalation_window_hours(),
            reaper_interval_minutes: default_reaper_interval_minutes(),
            escalation_interval_hours: default_escalation_interval_hours(),
        }
    }
}

/// Rental service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RentalConfig {
    /// Base URL of the rental service.
    pub base_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_redis_prefix() -> String {
    "rentmate".to_string()
}

const fn default_lock_ttl_minutes() -> u32 {
    30
}

const fn default_escalation_window_hours() -> u32 {
    72
}

const fn default_reaper_interval_minutes() -> u32 {
    30
}

const fn default_escalation_interval_hours() -> u32 {
    3
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `RENTMATE_ENV`)
    /// 3. Environment variables with `RENTMATE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("RENTMATE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RENTMATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("RENTMATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
