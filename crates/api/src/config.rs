//! Layered service configuration.
//!
//! Sources, later overriding earlier: `config/default.toml`, the optional
//! `config/local.toml`, then `MC__SECTION__KEY` environment variables.

use serde::Deserialize;
use std::net::SocketAddr;

/// Prefix for environment overrides, e.g. `MC__DATABASE__URL`.
pub const ENV_PREFIX: &str = "MC";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string; has no usable default.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        }
    }
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(db: &DatabaseConfig) -> Self {
        Self {
            url: db.url.clone(),
            max_connections: db.max_connections,
            min_connections: db.min_connections,
            connect_timeout_secs: db.connect_timeout_secs,
            idle_timeout_secs: db.idle_timeout_secs,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum number of records returned by a history read.
    pub history_limit: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            history_limit: domain::services::DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// A loaded configuration that cannot be used.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConfig {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key}: {reason}")]
    OutOfRange {
        key: &'static str,
        reason: &'static str,
    },
}

impl Config {
    /// Read every configuration source and check the result.
    pub fn load() -> Result<Self, config::ConfigError> {
        let loaded: Self = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        loaded
            .check()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(loaded)
    }

    /// Reject settings the service cannot start with.
    pub fn check(&self) -> Result<(), InvalidConfig> {
        if self.database.url.trim().is_empty() {
            return Err(InvalidConfig::Missing("MC__DATABASE__URL"));
        }
        if self.server.port == 0 {
            return Err(InvalidConfig::OutOfRange {
                key: "server.port",
                reason: "must be non-zero",
            });
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(InvalidConfig::OutOfRange {
                key: "database.min_connections",
                reason: "must not exceed database.max_connections",
            });
        }
        if self.audit.history_limit < 1 {
            return Err(InvalidConfig::OutOfRange {
                key: "audit.history_limit",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
