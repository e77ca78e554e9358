#![forbid(unsafe_code)]

//! Error type shared by the playback controller and frame assembly.

use core::time::Duration;

/// Errors reported synchronously to the caller of the offending method.
///
/// The controller never produces errors from its own state transitions;
/// every variant here is a caller contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Frame delay must be strictly positive.
    InvalidFrameDelay(Duration),
    /// Frame assembly requires `start < end`.
    InvalidRange {
        /// Requested start, formatted for display.
        start: String,
        /// Requested end, formatted for display.
        end: String,
    },
    /// Unknown playback speed label.
    UnknownSpeed(String),
    /// Unknown playback step label.
    UnknownStep(String),
}

impl core::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidFrameDelay(delay) => {
                write!(f, "frame delay must be positive, got {delay:?}")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "start {start} must be before end {end}")
            }
            Self::UnknownSpeed(label) => write!(f, "unknown playback speed: {label:?}"),
            Self::UnknownStep(label) => write!(f, "unknown playback step: {label:?}"),
        }
    }
}

impl std::error::Error for PlaybackError {}
