//! # Configuration
//!
//! Settings are layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. TOML file (`--config <path>`, or `charadex.toml` in the working directory)
//! 3. Environment variables (`CHARADEX_*`)
//! 4. CLI flags (applied by the `cli` module)
//!
//! ## Environment Variables
//!
//! - `CHARADEX_ENDPOINT`: GraphQL endpoint URL
//! - `CHARADEX_STORE`: favorites store path
//! - `CHARADEX_BACKEND`: `file`, `redb` or `memory`
//! - `CHARADEX_DEBOUNCE_MS`: search debounce in the browse session
//! - `CHARADEX_CACHE_TTL`: query cache staleness window, in seconds

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Public Rick and Morty GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://rickandmortyapi.com/graphql";

/// File picked up automatically when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "charadex.toml";

const BACKENDS: [&str; 3] = ["file", "redb", "memory"];

/// Errors raised while assembling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Invalid config file: {0}")]
    Parse(String),

    #[error("Invalid config value for '{key}': {value}")]
    Invalid { key: String, value: String },
}

/// HTTP server settings for `charadex serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Fully resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub endpoint: String,
    pub store_path: PathBuf,
    pub backend: String,
    pub debounce_ms: u64,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    /// Pages fetched per list query by following `info.next`.
    pub max_pages: u32,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            store_path: PathBuf::from("charadex-favorites.json"),
            backend: "file".to_string(),
            debounce_ms: 300,
            cache_ttl_secs: 60,
            request_timeout_secs: 10,
            max_pages: 1,
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load defaults, the TOML file and the process environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `CHARADEX_*` variables read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CHARADEX_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = lookup("CHARADEX_STORE") {
            self.store_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("CHARADEX_BACKEND") {
            self.backend = v;
        }
        if let Some(v) = lookup("CHARADEX_DEBOUNCE_MS") {
            self.debounce_ms = parse_number("CHARADEX_DEBOUNCE_MS", &v)?;
        }
        if let Some(v) = lookup("CHARADEX_CACHE_TTL") {
            self.cache_ttl_secs = parse_number("CHARADEX_CACHE_TTL", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "endpoint".to_string(),
                value: self.endpoint.clone(),
            });
        }
        if !BACKENDS.contains(&self.backend.as_str()) {
            return Err(ConfigError::Invalid {
                key: "backend".to_string(),
                value: self.backend.clone(),
            });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid {
                key: "max_pages".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
