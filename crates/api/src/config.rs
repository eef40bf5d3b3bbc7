//! Process configuration, read from the environment.
//!
//! `.env` is loaded first by `main` (dotenvy); real environment variables win.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use backoffice_observability::LogFormat;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name} '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_host: IpAddr,
    pub api_port: u16,
    /// Shared HS256 secret. Absent means every protected request fails with a
    /// configuration error; startup still succeeds.
    pub jwt_secret: Option<String>,
    /// Postgres role directory; in-memory when absent.
    pub database_url: Option<String>,
    /// JSON seed for the in-memory directory.
    pub role_seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
    /// Upper bound on the authorization pipeline of one request.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_host: IpAddr::from([0, 0, 0, 0]),
            api_port: 8080,
            jwt_secret: None,
            database_url: None,
            role_seed_file: None,
            log_format: LogFormat::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("role_seed_file", &self.role_seed_file)
            .field("log_format", &self.log_format)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_host = match var("API_HOST") {
            Some(value) => IpAddr::from_str(value.trim())
                .map_err(|e| ConfigError::invalid("API_HOST", &value, e))?,
            None => defaults.api_host,
        };

        let api_port = match var("API_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("API_PORT", &value, e))?,
            None => defaults.api_port,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(value) => value
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", &value, e))?,
            None => defaults.log_format,
        };

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::invalid(
                        "REQUEST_TIMEOUT_SECS",
                        &value,
                        "must be positive",
                    ));
                }
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => return Err(ConfigError::invalid("REQUEST_TIMEOUT_SECS", &value, e)),
            },
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_host,
            api_port,
            jwt_secret: var("JWT_SECRET"),
            database_url: var("DATABASE_URL"),
            role_seed_file: var("ROLE_SEED_FILE").map(PathBuf::from),
            log_format,
            request_timeout,
        })
    }

    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::from((self.api_host, self.api_port))
    }
}
