#![forbid(unsafe_code)]

//! Renderer-facing view of a frame notification.
//!
//! The controller only emits `(frame, index, total)`. [`FrameStatus`] turns
//! that into what the dashboard paints next to the map: a progress bar
//! value/max and a status line.

use std::fmt;

use crate::controller::{FrameEvent, PlaybackState};

/// Progress bar and status text for one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStatus {
    /// Progress bar value (current index).
    pub value: usize,
    /// Progress bar maximum (last index, 0 when empty).
    pub max: usize,
    /// Status line, e.g. `Frame 3/24`.
    pub label: String,
    /// Whether playback was running when the notification fired.
    pub state: PlaybackState,
}

impl FrameStatus {
    /// Build the status for a notification.
    #[must_use]
    pub fn from_event<T>(event: &FrameEvent<'_, T>, state: PlaybackState) -> Self {
        let label = if event.total == 0 {
            "No frames loaded".to_string()
        } else {
            format!("Frame {}/{}", event.index + 1, event.total)
        };
        Self {
            value: event.index,
            max: event.total.saturating_sub(1),
            label,
            state,
        }
    }

    /// Fraction of the sequence played, in `[0.0, 1.0]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        (self.value as f64 / self.max as f64).clamp(0.0, 1.0)
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.state.label())
    }
}
