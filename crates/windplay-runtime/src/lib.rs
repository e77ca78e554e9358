#![forbid(unsafe_code)]

//! Native host runtime for windplay.
//!
//! - [`PlaybackDriver`] - owns a controller on a driver thread and ticks it
//!   from wall time
//! - [`PlaybackConfig`] - TOML/JSON playback settings (feature `config`)
//! - [`init_tracing`] - global `tracing` subscriber setup

#[cfg(feature = "config")]
pub mod config;
pub mod driver;
pub mod logging;

#[cfg(feature = "config")]
pub use config::{ConfigError, PlaybackConfig};
pub use driver::{DriverError, DriverSnapshot, PlaybackDriver};
pub use logging::{LogConfig, LogFormat, LoggingError, init_tracing};
