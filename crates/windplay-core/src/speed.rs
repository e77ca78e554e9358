#![forbid(unsafe_code)]

//! Speed selector policy.
//!
//! The dashboard exposes a speed select next to the play button; each entry
//! is a multiplier applied to a base step duration. The resulting frame delay
//! is `base / multiplier`, never shorter than [`MIN_FRAME_DELAY`].

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// Shortest delay a speed multiplier can produce.
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(1);

/// Playback speed multiplier selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaybackSpeed {
    /// Half speed.
    #[cfg_attr(feature = "serde", serde(rename = "0.5x", alias = "0.5"))]
    Half,
    /// Real step duration.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "1x", alias = "1"))]
    Normal,
    /// Twice as fast.
    #[cfg_attr(feature = "serde", serde(rename = "2x", alias = "2"))]
    Double,
    /// Four times as fast.
    #[cfg_attr(feature = "serde", serde(rename = "4x", alias = "4"))]
    Quadruple,
}

impl PlaybackSpeed {
    /// Every selectable speed, slowest first.
    pub const ALL: [Self; 4] = [Self::Half, Self::Normal, Self::Double, Self::Quadruple];

    /// Multiplier applied to the base step.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::Double => 2.0,
            Self::Quadruple => 4.0,
        }
    }

    /// Label shown in the speed select.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Half => "0.5x",
            Self::Normal => "1x",
            Self::Double => "2x",
            Self::Quadruple => "4x",
        }
    }

    /// Frame delay for a base step at this speed.
    #[must_use]
    pub fn frame_delay(self, base_step: Duration) -> Duration {
        let delay = match self {
            Self::Half => base_step.saturating_mul(2),
            Self::Normal => base_step,
            Self::Double => base_step / 2,
            Self::Quadruple => base_step / 4,
        };
        delay.max(MIN_FRAME_DELAY)
    }

    /// Next faster speed, saturating at the fastest.
    #[must_use]
    pub fn faster(self) -> Self {
        match self {
            Self::Half => Self::Normal,
            Self::Normal => Self::Double,
            Self::Double | Self::Quadruple => Self::Quadruple,
        }
    }

    /// Next slower speed, saturating at the slowest.
    #[must_use]
    pub fn slower(self) -> Self {
        match self {
            Self::Quadruple => Self::Double,
            Self::Double => Self::Normal,
            Self::Normal | Self::Half => Self::Half,
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlaybackSpeed {
    type Err = PlaybackError;

    /// Accepts the select labels with or without the trailing `x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_suffix('x')
            .or_else(|| trimmed.strip_suffix('X'))
            .unwrap_or(trimmed);
        match bare {
            "0.5" | ".5" => Ok(Self::Half),
            "1" | "1.0" => Ok(Self::Normal),
            "2" | "2.0" => Ok(Self::Double),
            "4" | "4.0" => Ok(Self::Quadruple),
            _ => Err(PlaybackError::UnknownSpeed(s.to_string())),
        }
    }
}
