use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;
use crate::auth::password::HashConfig;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} must be a valid {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Read a variable that has no default.
pub fn required_env(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Read and parse a variable, falling back to `default` when unset.
pub fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected: std::any::type_name::<T>(),
        value: raw.to_string(),
    })
}

/// Parse a comma-separated origin list into header values.
fn parse_origins(var: &'static str, raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                var,
                expected: "origin",
                value: origin.to_string(),
            })
        })
        .collect()
}

/// Server configuration loaded from environment variables.
///
/// Everything except the database URL and the JWT secret has a default
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `1323`).
    pub port: u16,
    /// Deployment environment label (default: `local`).
    pub environment: String,
    /// Application name, also the JWT issuer (default: `User Service`).
    pub application_name: String,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Argon2 cost parameters.
    pub hashing: HashConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `1323`                     |
    /// | `ENVIRONMENT`          | `local`                    |
    /// | `APPLICATION_NAME`     | `User Service`             |
    /// | `DATABASE_URL`         | required                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// JWT and hashing variables are documented on [`JwtConfig::from_env`]
    /// and [`HashConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0".to_string())?;
        let port: u16 = env_or("PORT", 1323)?;
        let environment = env_or("ENVIRONMENT", "local".to_string())?;
        let application_name = env_or("APPLICATION_NAME", "User Service".to_string())?;
        let database_url = required_env("DATABASE_URL")?;

        let cors_origins = parse_origins(
            "CORS_ORIGINS",
            &env_or("CORS_ORIGINS", "http://localhost:5173".to_string())?,
        )?;

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;

        let jwt = JwtConfig::from_env(application_name.clone())?;
        let hashing = HashConfig::from_env()?;

        Ok(Self {
            host,
            port,
            environment,
            application_name,
            database_url,
            cors_origins,
            request_timeout_secs,
            jwt,
            hashing,
        })
    }
}
