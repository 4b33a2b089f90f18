//! Endpoint configuration store
//!
//! A single JSON record `{"baseURL": ..., "modelName": ...}` in the per-user
//! config directory. Loading never fails; saving surfaces I/O errors.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";
pub const DEFAULT_MODEL_NAME: &str = "qwen/qwen3-4b-2507";

const CONFIG_FILENAME: &str = "config.json";

/// Validated endpoint configuration; both fields are always non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "baseURL")]
    pub base_url: String,
    #[serde(rename = "modelName")]
    pub model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

/// Candidate configuration as supplied by a caller or found on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialConfig {
    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "modelName", default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl PartialConfig {
    /// Fill absent or empty fields with the built-in defaults
    pub fn validate(&self) -> Config {
        let defaults = Config::default();
        Config {
            base_url: non_empty(&self.base_url).unwrap_or(defaults.base_url),
            model_name: non_empty(&self.model_name).unwrap_or(defaults.model_name),
        }
    }

    /// Pick the string fields out of a persisted record.
    ///
    /// Fields of the wrong type are dropped one by one; the rest survive.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let field = |key: &str| match value.get(key) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => {
                warn!("⚠️ Ignoring config field {} with invalid value {}", key, other);
                None
            }
            None => None,
        };
        Self {
            base_url: field("baseURL"),
            model_name: field("modelName"),
        }
    }
}

impl From<Config> for PartialConfig {
    fn from(config: Config) -> Self {
        Self {
            base_url: Some(config.base_url),
            model_name: Some(config.model_name),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// File-backed store for [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::at(config_path())
    }
}

impl ConfigStore {
    /// Store backed by an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load config, writing defaults on first access.
    ///
    /// A malformed record is logged and replaced by defaults in memory only;
    /// the file on disk is left alone so the user can fix it.
    pub fn load(&self) -> Config {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("📝 No config at {}, writing defaults", self.path.display());
                let defaults = Config::default();
                if let Err(e) = self.write(&defaults) {
                    warn!("⚠️ Could not write default config: {}", e);
                }
                return defaults;
            }
            Err(e) => {
                warn!(
                    "⚠️ Could not read config at {}, using defaults: {}",
                    self.path.display(),
                    e
                );
                return Config::default();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) => {
                let config = PartialConfig::from_value(&value).validate();
                debug!("Loaded config: {:?}", config);
                config
            }
            Err(e) => {
                warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                Config::default()
            }
        }
    }

    /// Validate and persist a candidate config, returning what was written
    pub fn save(&self, candidate: &PartialConfig) -> Result<Config, ConfigError> {
        let config = candidate.validate();
        self.write(&config)?;
        info!("💾 Config saved to: {}", self.path.display());
        Ok(config)
    }

    fn write(&self, config: &Config) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, content).map_err(io_err)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("highlight-ai")
        .join(CONFIG_FILENAME)
}
