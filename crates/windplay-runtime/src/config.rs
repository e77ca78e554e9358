#![forbid(unsafe_code)]

//! Playback configuration loaded from TOML or JSON.
//!
//! ```toml
//! # windplay.toml
//! base_step_ms = 500
//! speed = "2x"
//! looping = true
//!
//! [log]
//! level = "windplay_core=debug,info"
//! format = "json"
//! ```
//!
//! ```rust,ignore
//! let cfg = PlaybackConfig::load_validated("windplay.toml")?;
//! let options = cfg.playback_options()?;
//! ```
//!
//! Missing keys fall back to [`PlaybackConfig::default`], which matches
//! [`PlaybackOptions::default`]: one second per frame at 1x, no loop.

use std::path::Path;

use serde::{Deserialize, Serialize};
use windplay_core::{PlaybackError, PlaybackOptions, PlaybackSpeed};

use crate::logging::LogConfig;

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Host-level playback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Frame delay at 1x speed, in milliseconds. Default: 1000.
    pub base_step_ms: u64,
    /// Speed multiplier applied to `base_step_ms`. Default: 1x.
    pub speed: PlaybackSpeed,
    /// Wrap from the last frame to the first. Default: false.
    pub looping: bool,
    /// Logging settings.
    pub log: LogConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_step_ms: 1000,
            speed: PlaybackSpeed::Normal,
            looping: false,
            log: LogConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load by file extension (`.toml` or `.json`) and validate.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("toml") => Self::from_toml_file(path)?,
            Some("json") => Self::from_json_file(path)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        tracing::debug!(
            path = %path.display(),
            base_step_ms = config.base_step_ms,
            speed = config.speed.label(),
            looping = config.looping,
            "loaded playback config"
        );
        Ok(config)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.base_step_ms == 0 {
            errors.push("base_step_ms must be > 0".into());
        }

        if self.log.level.trim().is_empty() {
            errors.push("log.level must not be empty".into());
        } else if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.log.level) {
            errors.push(format!("log.level is not a valid filter: {e}"));
        }

        errors
    }

    /// Frame delay and loop flag derived from this config.
    pub fn playback_options(&self) -> Result<PlaybackOptions, PlaybackError> {
        PlaybackOptions::from_speed(
            std::time::Duration::from_millis(self.base_step_ms),
            self.speed,
            self.looping,
        )
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a playback configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
    /// File extension is neither `.toml` nor `.json`.
    UnsupportedFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported config format (expected .toml or .json): {path}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) | Self::UnsupportedFormat(_) => None,
        }
    }
}
