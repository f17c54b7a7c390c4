//! User configuration.
//!
//! Loaded from `termctx/config.toml` under the platform config directory,
//! overridable with `TERMCTX_CONFIG`. Every field has a default, so running
//! without a config file is the normal case, not an error.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ContextError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TERMCTX_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub detect: DetectConfig,
}

/// Where session recordings live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory scanned for `*.cast` files when no exact transcript file
    /// is set. Defaults to `termctx/sessions` under the platform data
    /// directory.
    pub directory: Option<PathBuf>,
}

/// Prompt detection tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Extra prompt patterns tried after the built-in bank, matched against
    /// line starts. Invalid patterns are skipped with a warning.
    pub extra_patterns: Vec<String>,
}

impl Config {
    /// Loads the user config. A missing file yields defaults; a file that
    /// exists but fails to parse is an error, since a typo'd config should
    /// be fixed rather than silently ignored.
    pub fn load() -> Result<Self> {
        let Ok(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        let config = toml::from_str(&raw).map_err(|e| ContextError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        debug!(path = %path.display(), "loaded user config");
        Ok(config)
    }

    /// Resolves the config file location.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let base = dirs::config_dir().ok_or_else(|| ContextError::Config {
            reason: "could not determine the user configuration directory".into(),
        })?;
        Ok(base.join("termctx").join("config.toml"))
    }

    /// Directory scanned for session recordings.
    pub fn session_dir(&self) -> Option<PathBuf> {
        self.session.directory.clone().or_else(|| {
            dirs::data_local_dir().map(|d| d.join("termctx").join("sessions"))
        })
    }
}
