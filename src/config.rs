//! # Configuration
//!
//! Settings are read from the process environment (populated from `.env` by
//! `dotenvy` in development). Secrets may instead be supplied as files via the
//! `*_FILE` variables.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `DATABASE_URL` / `DATABASE_URL_FILE` | yes | |
//! | `JWT_SECRET` / `JWT_SECRET_FILE` | yes | |
//! | `BIND_ADDR` | no | `0.0.0.0:8090` |
//! | `READINESS_TIMEOUT_MS` | no | `5000` |
//! | `DB_MAX_CONNECTIONS` | no | `5` (must be > 0) |
//! | `LOG_FORMAT` | no | `pretty` (`json` for bunyan output) |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretSlice;
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

use crate::utils::constant::*;
use crate::utils::secret::get_secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to read secret file for `{name}`")]
    SecretFile {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Log output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" | "bunyan" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Runtime configuration for the service.
pub struct AppConfig {
    /// Connection options for the backing PostgreSQL database
    pub database: PgConnectOptions,
    /// HMAC key used to verify operator access tokens
    pub jwt_secret: SecretSlice<u8>,
    pub bind_addr: SocketAddr,
    /// Upper bound for one readiness probe
    pub readiness_timeout: Duration,
    pub db_max_connections: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required_secret(&lookup, "DATABASE_URL_FILE", "DATABASE_URL")?;
        let database =
            PgConnectOptions::from_str(&database_url).map_err(|e| ConfigError::Invalid {
                name: "DATABASE_URL",
                reason: e.to_string(),
            })?;

        let jwt_secret = required_secret(&lookup, "JWT_SECRET_FILE", "JWT_SECRET")?;
        let jwt_secret = SecretSlice::from(jwt_secret.into_bytes());

        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let readiness_timeout_ms: u64 = parse_or(
            &lookup,
            "READINESS_TIMEOUT_MS",
            Some(DEFAULT_READINESS_TIMEOUT.as_millis() as u64),
        )?;
        if readiness_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "READINESS_TIMEOUT_MS",
                reason: "must be greater than zero".into(),
            });
        }

        let db_max_connections: u32 =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", Some(DEFAULT_DB_MAX_CONNECTIONS))?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                reason: "must be greater than zero".into(),
            });
        }
        let log_format = parse_or(&lookup, "LOG_FORMAT", Some(LogFormat::default()))?;

        Ok(Self {
            database,
            jwt_secret,
            bind_addr,
            readiness_timeout: Duration::from_millis(readiness_timeout_ms),
            db_max_connections,
            log_format,
        })
    }
}

fn required_secret<F>(
    lookup: &F,
    file_var: &'static str,
    var: &'static str,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get_secret(lookup, file_var, var)
        .map_err(|source| ConfigError::SecretFile { name: var, source })?
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(var))
}

/// Parses `name` if set, otherwise falls back to `default`.
fn parse_or<F, T>(lookup: &F, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}
