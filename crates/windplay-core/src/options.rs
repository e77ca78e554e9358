#![forbid(unsafe_code)]

//! Playback configuration snapshot.
//!
//! [`PlaybackOptions`] is validated on construction, so a value held by the
//! controller always carries a strictly positive frame delay.

use core::time::Duration;

use crate::error::PlaybackError;
use crate::speed::PlaybackSpeed;

/// Default delay between frames.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(1000);

/// Immutable playback configuration: frame delay and loop flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOptions {
    frame_delay: Duration,
    looping: bool,
}

impl PlaybackOptions {
    /// Create options, rejecting a zero frame delay.
    pub fn new(frame_delay: Duration, looping: bool) -> Result<Self, PlaybackError> {
        if frame_delay.is_zero() {
            return Err(PlaybackError::InvalidFrameDelay(frame_delay));
        }
        Ok(Self {
            frame_delay,
            looping,
        })
    }

    /// Create options from a delay in milliseconds.
    pub fn from_millis(frame_delay_ms: u64, looping: bool) -> Result<Self, PlaybackError> {
        Self::new(Duration::from_millis(frame_delay_ms), looping)
    }

    /// Create options from a base step duration scaled by a speed multiplier.
    pub fn from_speed(
        base_step: Duration,
        speed: PlaybackSpeed,
        looping: bool,
    ) -> Result<Self, PlaybackError> {
        if base_step.is_zero() {
            return Err(PlaybackError::InvalidFrameDelay(base_step));
        }
        Self::new(speed.frame_delay(base_step), looping)
    }

    /// Copy with a different loop flag (builder pattern).
    #[must_use]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Copy with a different frame delay.
    pub fn with_frame_delay(self, frame_delay: Duration) -> Result<Self, PlaybackError> {
        Self::new(frame_delay, self.looping)
    }

    /// Delay between consecutive ticks.
    #[inline]
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// Whether playback wraps from the last frame to the first.
    #[inline]
    #[must_use]
    pub fn looping(&self) -> bool {
        self.looping
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            frame_delay: DEFAULT_FRAME_DELAY,
            looping: false,
        }
    }
}
