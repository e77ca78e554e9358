#![forbid(unsafe_code)]

//! `windplay` command-line tool.
//!
//! - `windplay frames` aligns station observations onto a step grid and
//!   prints the resulting wind frames as JSON.
//! - `windplay play` plays a frame file in the terminal through a
//!   [`windplay_runtime::PlaybackDriver`], one status line per frame.

pub mod cli;
pub mod error;
pub mod frames;
pub mod play;

use std::path::Path;

use serde::de::DeserializeOwned;
use windplay_runtime::{LogConfig, LogFormat, LoggingError, init_tracing};

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};

/// Read and deserialize a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Install the global subscriber, tolerating one that is already set.
pub(crate) fn install_logging(mut log: LogConfig, format: Option<LogFormat>) -> Result<()> {
    if let Some(format) = format {
        log.format = format;
    }
    match init_tracing(&log) {
        Ok(()) | Err(LoggingError::AlreadyInitialized(_)) => Ok(()),
        Err(error) => Err(error.into()),
    }
}
