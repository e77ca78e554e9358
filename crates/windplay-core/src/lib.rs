#![forbid(unsafe_code)]

//! Playback core for the windplay station dashboard.
//!
//! # Key Components
//!
//! - [`PlaybackController`] - timer-driven traversal of a frame sequence
//! - [`PlaybackOptions`] - validated frame delay and loop flag
//! - [`PlaybackSpeed`] - speed select policy mapping to frame delays
//! - [`wind`] - wind frame payload and step-grid frame assembly
//! - [`FrameStatus`] - progress/status view of a notification
//!
//! # Role in windplay
//! `windplay-core` has no threads and never blocks, so it runs unchanged
//! inside a browser host where a JS interval calls
//! [`PlaybackController::tick`]. Native hosts use `windplay-runtime`, which
//! owns a controller on a driver thread.

pub mod controller;
pub mod error;
pub mod options;
pub mod speed;
pub mod status;
pub mod wind;

pub use controller::{
    FrameEvent, FrameHandler, MAX_TICKS_PER_ADVANCE, PlaybackController, PlaybackState,
    PlaybackTimer, TimerId,
};
pub use error::PlaybackError;
pub use options::{DEFAULT_FRAME_DELAY, PlaybackOptions};
pub use speed::PlaybackSpeed;
pub use status::FrameStatus;
pub use wind::{
    FrameQuality, MAX_PLAYBACK_FRAMES, Observation, PlaybackStep, QualityCounts, WindFrame,
    WindRoseBin, WindRoseSummary,
};
