// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup by [`AppConfig::from_env`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8000` |
//! | `DATA_DIR` | Directory holding the redb database file | `./data` |
//! | `JWT_SECRET` | HS256 signing secret (at least 32 bytes) | Required (dev builds fall back) |
//! | `TOKEN_TTL_MINUTES` | Access token lifetime, at most 30 days | `30` |
//! | `ALLOWED_ORIGINS` | Comma-separated CORS origins | `http://localhost:5173`, `http://localhost:3000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8000;

/// Environment variable name for the data directory path.
///
/// The database file `planner.redb` is created inside it.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Environment variable name for the JWT signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Minimum accepted secret length in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Environment variable name for the access token lifetime in minutes.
pub const TOKEN_TTL_MINUTES_ENV: &str = "TOKEN_TTL_MINUTES";
pub const DEFAULT_TOKEN_TTL_MINUTES: u64 = 30;

/// Longest accepted token lifetime (30 days).
pub const MAX_TOKEN_TTL_MINUTES: u64 = 30 * 24 * 60;

/// Environment variable name for the allowed CORS origins.
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[cfg(feature = "dev")]
const DEV_JWT_SECRET: &str = "dev-mode-secret-not-for-production-use-0123456789";

/// Configuration errors reported at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakSecret,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: u64,
    pub allowed_origins: Vec<String>,
    pub log_format: LogFormat,
    /// `JWT_SECRET` was unset and the built-in development secret is in use.
    pub dev_secret: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir =
            PathBuf::from(lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let (jwt_secret, uses_dev_secret) =
            match lookup(JWT_SECRET_ENV).filter(|s| !s.is_empty()) {
                Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                    return Err(ConfigError::WeakSecret)
                }
                Some(secret) => (secret, false),
                None => (dev_secret()?, true),
            };

        let token_ttl_minutes = match lookup(TOKEN_TTL_MINUTES_ENV) {
            Some(value) => match value.parse::<u64>() {
                Ok(minutes) if (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) => minutes,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_MINUTES_ENV,
                        value,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let allowed_origins = lookup(ALLOWED_ORIGINS_ENV)
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret,
            token_ttl_minutes,
            allowed_origins,
            log_format,
            dev_secret: uses_dev_secret,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                value: self.host.clone(),
            })
    }

    /// Path of the database file inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(crate::storage::DATABASE_FILE)
    }

    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_minutes.saturating_mul(60)
    }
}

#[cfg(feature = "dev")]
fn dev_secret() -> Result<String, ConfigError> {
    Ok(DEV_JWT_SECRET.to_string())
}

#[cfg(not(feature = "dev"))]
fn dev_secret() -> Result<String, ConfigError> {
    Err(ConfigError::Missing(JWT_SECRET_ENV))
}
