//! Form configuration: built-in defaults, then a TOML file, then environment.

use crate::error::ConfigError;
use crate::payload::AccessKey;
use crate::relay::DEFAULT_ENDPOINT;
use crate::state::ReentryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "flowparty.toml";

pub const ENV_ENDPOINT: &str = "FLOWPARTY_ENDPOINT";
pub const ENV_ACCESS_KEY: &str = "FLOWPARTY_ACCESS_KEY";
pub const ENV_TIMEOUT_SECS: &str = "FLOWPARTY_TIMEOUT_SECS";
pub const ENV_REENTRY: &str = "FLOWPARTY_REENTRY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Relay submission URL.
    pub endpoint: String,
    /// Relay credential. Required before anything can be submitted.
    pub access_key: Option<AccessKey>,
    pub reentry: ReentryPolicy,
    /// Request timeout. `None` waits forever.
    pub timeout_secs: Option<u64>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_key: None,
            reentry: ReentryPolicy::default(),
            timeout_secs: None,
        }
    }
}

impl FormConfig {
    /// Resolve the effective configuration.
    ///
    /// An explicit `path` must exist. Without one, `flowparty.toml` is read if
    /// present. Environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        tracing::debug!(path = %shown, "loaded form config");
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(key) = lookup(ENV_ACCESS_KEY) {
            self.access_key = Some(AccessKey::new(key));
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            self.timeout_secs = Some(secs);
        }
        if let Some(raw) = lookup(ENV_REENTRY) {
            self.reentry = raw.parse().map_err(|value| ConfigError::InvalidValue {
                key: ENV_REENTRY,
                value,
            })?;
        }
        Ok(self)
    }

    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(AccessKey::new(key));
        self
    }

    /// The credential, or an error if it is missing or blank.
    pub fn require_access_key(&self) -> Result<&AccessKey, ConfigError> {
        self.access_key
            .as_ref()
            .filter(|k| !k.expose().trim().is_empty())
            .ok_or(ConfigError::MissingAccessKey)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
