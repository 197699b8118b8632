pub mod database;

pub use database::{DatabaseSettings, SslMode};

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Logging profile: `debug`, `dev` or `prod`.
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_err() {
            tracing::debug!("No .env file found, using process environment only");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let server = ServerSettings {
            host: env.or("APP_HOST", "0.0.0.0"),
            port: env.parse_or("APP_PORT", 8080)?,
            log_level: env.or("LOG_LEVEL", "dev"),
        };

        let database = DatabaseSettings {
            user: env.required("DB_USER")?,
            password: env.required("DB_PASSWORD")?,
            host: env.or("DB_HOST", "localhost"),
            port: env.parse_or("DB_PORT", 5432)?,
            name: env.required("DB_NAME")?,
            ssl_mode: env.parse_or("DB_SSLMODE", SslMode::Disable)?,
            max_connections: env.parse_or("DB_MAX_CONNECTIONS", 10)?,
            run_migrations: env.parse_or("DB_RUN_MIGRATIONS", true)?,
        };

        Ok(Self { server, database })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    // Blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: value.clone(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}
