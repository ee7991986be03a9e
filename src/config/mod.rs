//! Configuration module.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::cache::CacheConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server listens on.
    pub listen_port: u16,

    /// Base URL of the remote workgroup settings service.
    pub settings_url: Url,

    /// Timeout for one settings request.
    pub settings_timeout: Duration,

    /// Directory holding static web assets (the blank image lives here).
    pub web_root: PathBuf,

    /// Shared secret required on change notifications, if set.
    pub notify_secret: Option<String>,

    /// Optional bound on cached workgroups. Unbounded when unset.
    pub cache_max_capacity: Option<u64>,

    /// Optional time-to-live for cached bundles. No expiry when unset.
    pub cache_ttl: Option<Duration>,

    /// Undelivered change events buffered per subscriber.
    pub change_event_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let settings_url = var("SETTINGS_SERVICE_URL").context("SETTINGS_SERVICE_URL must be set")?;
        let settings_url = Url::parse(&settings_url)
            .with_context(|| format!("Invalid SETTINGS_SERVICE_URL: {settings_url}"))?;

        Ok(Self {
            listen_port: parse_var(&var, "LISTEN_PORT")?.unwrap_or(8080),
            settings_url,
            settings_timeout: Duration::from_secs(
                parse_var(&var, "SETTINGS_TIMEOUT_SECS")?.unwrap_or(10),
            ),
            web_root: var("WEB_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./web")),
            notify_secret: var("NOTIFY_SECRET"),
            cache_max_capacity: parse_var(&var, "CACHE_MAX_CAPACITY")?,
            cache_ttl: parse_var(&var, "CACHE_TTL_SECS")?.map(Duration::from_secs),
            change_event_buffer: parse_var(&var, "CHANGE_EVENT_BUFFER")?.unwrap_or(256),
        })
    }

    /// Cache settings for workgroup bundles.
    pub fn cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::unbounded();
        if let Some(capacity) = self.cache_max_capacity {
            config = config.max_capacity(capacity);
        }
        if let Some(ttl) = self.cache_ttl {
            config = config.ttl(ttl);
        }
        config
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid {key}: {raw}"))
        })
        .transpose()
}
