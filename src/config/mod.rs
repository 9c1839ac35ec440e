//
//  gitlab-tools
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Builds the immutable configuration snapshot the gateway is constructed
//! with, and keeps it in a [`ConfigStore`] that can be reloaded on demand.
//!
//! ## Layers
//!
//! Later layers win:
//!
//! 1. Built-in defaults (read-only on, no filters, 30s timeout, 5 batch lookups)
//! 2. The optional TOML file (see [`file`])
//! 3. Environment variables:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `GITLAB_URL` | Instance base URL (required) |
//! | `GITLAB_TOKEN` | Access token (required) |
//! | `GITLAB_READ_ONLY` | Only the literal `false` turns read-only mode off |
//! | `GITLAB_TIMEZONE` | IANA timezone reported to clients |
//! | `GITLAB_USE_STRUCTURED_CONTENT` | Only the literal `false` turns it off |
//! | `GITLAB_NAMESPACES` | Comma-separated namespace prefixes |
//! | `GITLAB_MEMBERSHIP_ONLY` | `true`/`false` |
//! | `GITLAB_TIMEOUT_SECS` | Per-request timeout |
//! | `GITLAB_BATCH_CONCURRENCY` | Lookups in flight for batch tools |
//!
//! ## Snapshots
//!
//! A [`Config`] is never mutated after it is built. [`ConfigStore::reload`]
//! builds a fresh snapshot and swaps the shared pointer; anything still
//! holding the previous `Arc<Config>` keeps reading the old values.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gitlab_tools::config::ConfigStore;
//!
//! let store = ConfigStore::load()?;
//! let config = store.current();
//! println!("GitLab at {}", config.gitlab.url);
//! # Ok::<(), gitlab_tools::config::ConfigError>(())
//! ```

mod file;

pub use file::*;

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Environment variable names.
pub mod env {
    /// Instance base URL
    pub const URL: &str = "GITLAB_URL";
    /// Access token
    pub const TOKEN: &str = "GITLAB_TOKEN";
    /// Read-only gate
    pub const READ_ONLY: &str = "GITLAB_READ_ONLY";
    /// Reported timezone
    pub const TIMEZONE: &str = "GITLAB_TIMEZONE";
    /// Structured envelope switch
    pub const USE_STRUCTURED_CONTENT: &str = "GITLAB_USE_STRUCTURED_CONTENT";
    /// Namespace whitelist
    pub const NAMESPACES: &str = "GITLAB_NAMESPACES";
    /// Membership-only project listings
    pub const MEMBERSHIP_ONLY: &str = "GITLAB_MEMBERSHIP_ONLY";
    /// Per-request timeout in seconds
    pub const TIMEOUT_SECS: &str = "GITLAB_TIMEOUT_SECS";
    /// Batch lookups in flight
    pub const BATCH_CONCURRENCY: &str = "GITLAB_BATCH_CONCURRENCY";
}

/// Default reported timezone.
pub const DEFAULT_TIMEZONE: &str = "Europe/Moscow";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while building a configuration snapshot.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is missing or blank.
    #[error("{0} is not set. Ensure GITLAB_URL and GITLAB_TOKEN are configured")]
    Missing(&'static str),

    /// A setting has a value that cannot be used.
    #[error("Invalid value for {key}: {message}")]
    Invalid {
        /// Setting name
        key: &'static str,
        /// What was wrong
        message: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

/// The configuration file in effect: `GLT_CONFIG` when set, otherwise the
/// platform default. The file itself may not exist.
pub fn config_file_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// Connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct GitLabConfig {
    /// Instance base URL, e.g. `https://gitlab.example.com`
    pub url: Url,
    /// Bearer token presented on every request
    pub token: String,
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("url", &self.url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Client-side filters applied to project listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Default for the `membership` flag of project listings
    pub include_membership_only: bool,
    /// Namespace prefixes to keep; empty keeps everything
    pub include_namespaces: Vec<String>,
}

/// Immutable configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Connection settings
    pub gitlab: GitLabConfig,
    /// Project listing filters
    pub filters: FilterConfig,
    /// Refuse mutating tools before touching the network
    pub read_only: bool,
    /// IANA timezone reported to clients
    pub timezone: String,
    /// Emit structured envelopes rather than plain text
    pub use_structured_content: bool,
    /// Upper bound for one request, in seconds
    pub request_timeout_secs: u64,
    /// Lookups in flight for batch tools
    pub batch_concurrency: usize,
}

impl Config {
    /// Builds a snapshot from the default file location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        let file = match &path {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        debug!(path = ?path, "loading configuration");
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merges a file layer with environment lookups into a validated snapshot.
    ///
    /// `env` is called with variable names from [`env`]; returning `None`
    /// means the variable is unset.
    pub fn resolve<E>(file: FileConfig, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let url = env(env::URL)
            .or(file.gitlab.url)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(env::URL))?;
        let url = parse_base_url(url.trim())?;

        let token = env(env::TOKEN)
            .or(file.gitlab.token)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(env::TOKEN))?;

        let read_only = match env(env::READ_ONLY) {
            Some(v) => v != "false",
            None => file.read_only.unwrap_or(true),
        };

        let use_structured_content = match env(env::USE_STRUCTURED_CONTENT) {
            Some(v) => v != "false",
            None => file.use_structured_content.unwrap_or(true),
        };

        let timezone = env(env::TIMEZONE)
            .or(file.timezone)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let include_namespaces = match env(env::NAMESPACES) {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => file.filters.include_namespaces.unwrap_or_default(),
        };

        let include_membership_only = match env(env::MEMBERSHIP_ONLY) {
            Some(v) => parse_bool(env::MEMBERSHIP_ONLY, &v)?,
            None => file.filters.include_membership_only.unwrap_or(false),
        };

        let request_timeout_secs = match env(env::TIMEOUT_SECS) {
            Some(v) => parse_positive(env::TIMEOUT_SECS, &v)?,
            None => file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let batch_concurrency = match env(env::BATCH_CONCURRENCY) {
            Some(v) => parse_positive(env::BATCH_CONCURRENCY, &v)?,
            None => file
                .batch_concurrency
                .map(|n| n as u64)
                .unwrap_or(crate::api::batch::DEFAULT_CONCURRENCY as u64),
        };

        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: env::TIMEOUT_SECS,
                message: "must be greater than zero".to_string(),
            });
        }
        if batch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: env::BATCH_CONCURRENCY,
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            gitlab: GitLabConfig { url, token },
            filters: FilterConfig {
                include_membership_only,
                include_namespaces,
            },
            read_only,
            timezone,
            use_structured_content,
            request_timeout_secs,
            batch_concurrency: batch_concurrency as usize,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: env::URL,
        message: format!("'{raw}' is not a valid URL ({e})"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key: env::URL,
            message: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            message: format!("expected true or false, got '{raw}'"),
        }),
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
        key,
        message: format!("expected a positive integer, got '{raw}'"),
    })
}

type Loader = Box<dyn Fn() -> Result<Config, ConfigError> + Send + Sync>;

/// Holds the current configuration snapshot and rebuilds it on request.
pub struct ConfigStore {
    current: RwLock<Arc<Config>>,
    loader: Loader,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Loads from the default file location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::with_loader(Config::load)
    }

    /// Builds a store around a custom loader, running it once immediately.
    pub fn with_loader<F>(loader: F) -> Result<Self, ConfigError>
    where
        F: Fn() -> Result<Config, ConfigError> + Send + Sync + 'static,
    {
        let initial = loader()?;
        Ok(Self {
            current: RwLock::new(Arc::new(initial)),
            loader: Box::new(loader),
        })
    }

    /// The snapshot in effect right now.
    pub fn current(&self) -> Arc<Config> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Rebuilds the snapshot and swaps it in.
    ///
    /// On failure the previous snapshot stays in effect.
    pub fn reload(&self) -> Result<Arc<Config>, ConfigError> {
        let fresh = Arc::new((self.loader)()?);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&fresh);
        debug!("configuration reloaded");
        Ok(fresh)
    }
}
