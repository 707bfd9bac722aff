// src/config.rs
use std::{
    collections::HashSet,
    fmt::Debug,
    net::SocketAddr,
    time::Duration,
};

use thiserror::Error;

use crate::origin::normalize_origin;

pub const URL_KEYS: [&str; 2] = ["CHAT_WEBHOOK_URL", "N8N_WEBHOOK_URL"];
pub const SECRET_KEYS: [&str; 2] = ["CHAT_WEBHOOK_SECRET", "N8N_WEBHOOK_SECRET"];
pub const ALLOWED_ORIGINS_KEY: &str = "CHAT_ALLOWED_ORIGINS";
pub const TIMEOUT_KEY: &str = "CHAT_UPSTREAM_TIMEOUT_SECS";
pub const BIND_ADDR_KEY: &str = "BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid CHAT_UPSTREAM_TIMEOUT_SECS {0:?}: expected a positive number of seconds")]
    Timeout(String),
}

/// Settings for the relay handler. Built once at startup, read-only after.
#[derive(Clone)]
pub struct RelayConfig {
    pub upstream_url: Option<String>,
    pub upstream_secret: Option<String>,
    pub allowed_origins: HashSet<String>,
    pub upstream_timeout: Duration,
}

impl Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("upstream_url", &self.upstream_url)
            .field(
                "upstream_secret",
                &self.upstream_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("allowed_origins", &self.allowed_origins)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstream_url: None,
            upstream_secret: None,
            allowed_origins: HashSet::new(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl RelayConfig {
    pub fn with_upstream(url: impl Into<String>) -> Self {
        Self {
            upstream_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Build from an arbitrary key lookup. Paired keys resolve to the first non-empty value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_timeout = match non_empty(&lookup, TIMEOUT_KEY) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        Ok(Self {
            upstream_url: first_non_empty(&lookup, &URL_KEYS),
            upstream_secret: first_non_empty(&lookup, &SECRET_KEYS),
            allowed_origins: non_empty(&lookup, ALLOWED_ORIGINS_KEY)
                .map(|raw| parse_allowed_origins(&raw))
                .unwrap_or_default(),
            upstream_timeout,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.upstream_url.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub relay: RelayConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr =
            non_empty(&lookup, BIND_ADDR_KEY).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::BindAddr {
                value: raw_addr.clone(),
                source,
            })?;

        Ok(Self {
            bind_addr,
            relay: RelayConfig::from_lookup(lookup)?,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_non_empty<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| non_empty(lookup, key))
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Timeout(raw.to_string())),
    }
}

fn parse_allowed_origins(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let origin = normalize_origin(entry);
            if origin.is_none() {
                tracing::warn!(entry, "ignoring unparseable allowed origin");
            }
            origin
        })
        .collect()
}
