//! Store and source configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QUOTEBOARD_DEFAULT_TAB` | `IPSA` | Tab activated by `bootstrap` |
//! | `QUOTEBOARD_TABS` | `IPSA,IGPA,NASDAQ,DOW JONES,SP/BVL` | Comma-separated known tabs |
//! | `QUOTEBOARD_FETCH_TIMEOUT_MS` | `10000` | Per-fetch timeout, `0` disables it |
//! | `QUOTEBOARD_DATA_DIR` | - | Read payloads from this directory |
//! | `QUOTEBOARD_BASE_URL` | - | Read payloads from this URL (used when no data dir is set) |

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{HttpSource, JsonDirSource};
use crate::{MarketDataSource, Tab, ValidationError};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings of an [`InstrumentStore`](crate::InstrumentStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub default_tab: Tab,
    pub tabs: Vec<Tab>,
    /// Upper bound for each summary/history fetch. `None` waits forever.
    pub fetch_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_tab: Tab::default(),
            tabs: Tab::defaults(),
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
        }
    }
}

impl StoreConfig {
    /// Read overrides from `QUOTEBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("QUOTEBOARD_DEFAULT_TAB") {
            config.default_tab = Tab::parse(&raw)?;
        }

        if let Some(raw) = lookup("QUOTEBOARD_TABS") {
            config.tabs = raw
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(Tab::parse)
                .collect::<Result<Vec<_>, _>>()?;
        }

        if let Some(raw) = lookup("QUOTEBOARD_FETCH_TIMEOUT_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| ValidationError::InvalidConfig {
                key: "QUOTEBOARD_FETCH_TIMEOUT_MS",
                value: raw.clone(),
            })?;
            config.fetch_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }

        Ok(config)
    }

    pub fn with_default_tab(mut self, tab: Tab) -> Self {
        self.default_tab = tab;
        self
    }

    pub fn with_tabs(mut self, tabs: Vec<Tab>) -> Self {
        self.tabs = tabs;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Where market payloads are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Dir(PathBuf),
    Http { base_url: String },
}

impl SourceConfig {
    /// `QUOTEBOARD_DATA_DIR` wins over `QUOTEBOARD_BASE_URL`; `None` when
    /// neither is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("QUOTEBOARD_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| Self::Dir(PathBuf::from(dir)))
            .or_else(|| {
                lookup("QUOTEBOARD_BASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .map(|base_url| Self::Http { base_url })
            })
    }

    /// Build the configured source.
    pub fn build(&self) -> Arc<dyn MarketDataSource> {
        match self {
            Self::Dir(root) => Arc::new(JsonDirSource::new(root.clone())),
            Self::Http { base_url } => Arc::new(HttpSource::new(base_url.clone())),
        }
    }
}
