//! Configuration loading and representation.

use std::net::SocketAddr;

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Postgres stores are used when set; in-memory otherwise.
    pub database_url: Option<String>,
    /// Offset used to decide "today" when a request does not pin its own day.
    pub utc_offset: FixedOffset,
    /// Days an expired batch is kept before `purge_expired` removes it.
    pub retention_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            database_url: None,
            utc_offset: Utc.fix(),
            retention_days: 30,
        }
    }
}

const DEV_JWT_SECRET: &str = "dev-secret";

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup` (testable without touching the env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: format!("{e}"),
            })?,
            None => defaults.bind_addr,
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let utc_offset = match lookup("SHELFWATCH_UTC_OFFSET_MINUTES") {
            Some(raw) => parse_offset_minutes(&raw)?,
            None => defaults.utc_offset,
        };

        let retention_days = match lookup("SHELFWATCH_RETENTION_DAYS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "SHELFWATCH_RETENTION_DAYS",
                reason: format!("{e}"),
            })?,
            None => defaults.retention_days,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            utc_offset,
            retention_days,
        })
    }
}

fn parse_offset_minutes(raw: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "SHELFWATCH_UTC_OFFSET_MINUTES",
        reason,
    };
    let minutes: i32 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| invalid(format!("{minutes} minutes is out of range")))
}
