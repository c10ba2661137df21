//! Service configuration loaded from the environment

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(self.ssl_mode)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server_host: String,
    pub server_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from `.env` (if present) and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_err() {
            tracing::debug!("No .env file found, using environment variables");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            database: DatabaseConfig {
                host: get("DB_HOST", "localhost"),
                port: parse("DB_PORT", get("DB_PORT", "5432"), "port number")?,
                user: get("DB_USER", "postgres"),
                password: get("DB_PASSWORD", ""),
                name: get("DB_NAME", "core_bank"),
                ssl_mode: parse("DB_SSL_MODE", get("DB_SSL_MODE", "disable"), "ssl mode")?,
                max_connections: parse(
                    "DB_MAX_CONNECTIONS",
                    get("DB_MAX_CONNECTIONS", "10"),
                    "connection count",
                )?,
            },
            server_host: get("SERVER_HOST", "localhost"),
            server_port: parse("SERVER_PORT", get("SERVER_PORT", "8080"), "port number")?,
            environment: get("APP_ENV", "development"),
            log_level: get("LOG_LEVEL", "info"),
        })
    }

    pub fn server_address(&self) -> (String, u16) {
        (self.server_host.clone(), self.server_port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse<T: FromStr>(
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        })
}
