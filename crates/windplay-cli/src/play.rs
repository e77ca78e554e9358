use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use clap::Args;
use windplay_core::{FrameEvent, FrameStatus, PlaybackSpeed, PlaybackState, WindFrame};
use windplay_runtime::{LogFormat, PlaybackConfig, PlaybackDriver};

use crate::error::Result;
use crate::{install_logging, read_json};

/// Extra wait past one frame delay before asking the driver whether it stopped.
const STOP_POLL_SLACK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    /// JSON array of wind frames (as printed by `windplay frames`).
    pub frames: PathBuf,

    /// Speed multiplier (0.5x, 1x, 2x, 4x).
    #[arg(long)]
    pub speed: Option<PlaybackSpeed>,

    /// Frame delay at 1x, in milliseconds.
    #[arg(long = "base-step-ms", value_parser = clap::value_parser!(u64).range(1..))]
    pub base_step_ms: Option<u64>,

    /// Wrap from the last frame to the first.
    #[arg(long = "loop")]
    pub looping: bool,

    /// Playback config file (.toml or .json).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop after this many frame advances.
    #[arg(long = "max-ticks", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_ticks: Option<u64>,
}

impl PlayArgs {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<PlaybackConfig> {
        let mut config = match &self.config {
            Some(path) => PlaybackConfig::load_validated(path)?,
            None => PlaybackConfig::default(),
        };
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(base_step_ms) = self.base_step_ms {
            config.base_step_ms = base_step_ms;
        }
        config.looping |= self.looping;
        Ok(config)
    }
}

/// One notification as seen by the driver's subscriber.
struct Notice {
    seq: u64,
    index: usize,
    total: usize,
    frame: Option<WindFrame>,
}

/// Render a frame as a single status line.
pub fn describe(status: &FrameStatus, frame: Option<&WindFrame>) -> String {
    let Some(frame) = frame else {
        return status.to_string();
    };
    let speed = frame
        .speed
        .map_or_else(|| "-".to_string(), |s| format!("{s:.1} m/s"));
    let toward = frame
        .direction
        .map_or_else(|| "-".to_string(), |d| format!("{d:.0}°"));
    format!(
        "{status}  {}  speed {speed}  toward {toward}  [{}]",
        frame.datetime.format("%Y-%m-%d %H:%M"),
        frame.quality.label()
    )
}

pub fn run_play(args: &PlayArgs, log_format: Option<LogFormat>, out: &mut impl Write) -> Result<()> {
    let config = args.resolve_config()?;
    install_logging(config.log.clone(), log_format)?;

    let frames: Vec<WindFrame> = read_json(&args.frames)?;
    let options = config.playback_options()?;
    tracing::info!(
        frames = frames.len(),
        speed = config.speed.label(),
        frame_delay_ms = options.frame_delay().as_millis() as u64,
        looping = options.looping(),
        "starting playback"
    );

    let (tx, rx) = mpsc::channel();
    let mut seq = 0u64;
    let driver = PlaybackDriver::spawn(options, move |event: FrameEvent<'_, WindFrame>| {
        let _ = tx.send(Notice {
            seq,
            index: event.index,
            total: event.total,
            frame: event.frame.cloned(),
        });
        seq += 1;
    })?;
    driver.set_frames(frames)?;
    driver.play()?;

    // Notice 0 is the empty state at subscription, notice 1 follows
    // `set_frames`; everything later is a timer advance.
    let wait = options.frame_delay() + STOP_POLL_SLACK;
    let mut ticks = 0u64;
    loop {
        match rx.recv_timeout(wait) {
            Ok(notice) if notice.seq == 0 => {}
            Ok(notice) => {
                let state = if notice.seq == 1 {
                    PlaybackState::Stopped
                } else {
                    ticks += 1;
                    PlaybackState::Running
                };
                let event = FrameEvent {
                    frame: notice.frame.as_ref(),
                    index: notice.index,
                    total: notice.total,
                };
                let status = FrameStatus::from_event(&event, state);
                writeln!(out, "{}", describe(&status, notice.frame.as_ref()))?;
                if args.max_ticks.is_some_and(|max| ticks >= max) {
                    tracing::debug!(ticks, "tick limit reached");
                    driver.pause()?;
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !driver.snapshot()?.playing {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let last = driver.snapshot()?;
    driver.shutdown()?;
    writeln!(
        out,
        "Playback finished: {ticks} advances, stopped at frame {}/{}",
        if last.total == 0 { 0 } else { last.index + 1 },
        last.total
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use windplay_core::FrameQuality;

    fn frame(hour: u32) -> WindFrame {
        WindFrame {
            datetime: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            speed: Some(3.4),
            direction: Some(225.0),
            temperature: None,
            pressure: None,
            quality: FrameQuality::Observed,
            dx: None,
            dy: None,
        }
    }

    #[test]
    fn describe_includes_wind() {
        let f = frame(6);
        let event = FrameEvent {
            frame: Some(&f),
            index: 1,
            total: 4,
        };
        let status = FrameStatus::from_event(&event, PlaybackState::Running);
        assert_eq!(
            describe(&status, Some(&f)),
            "Frame 2/4 (playing)  2024-02-01 06:00  speed 3.4 m/s  toward 225°  [observed]"
        );
    }

    #[test]
    fn describe_without_frame_is_status_only() {
        let event: FrameEvent<'_, WindFrame> = FrameEvent {
            frame: None,
            index: 0,
            total: 0,
        };
        let status = FrameStatus::from_event(&event, PlaybackState::Stopped);
        assert_eq!(describe(&status, None), "No frames loaded (paused)");
    }

    #[test]
    fn flags_override_defaults() {
        let args = PlayArgs {
            frames: PathBuf::from("unused.json"),
            speed: Some(PlaybackSpeed::Quadruple),
            base_step_ms: Some(400),
            looping: true,
            config: None,
            max_ticks: None,
        };
        let config = args.resolve_config().unwrap();
        let options = config.playback_options().unwrap();
        assert_eq!(options.frame_delay(), Duration::from_millis(100));
        assert!(options.looping());
    }
}
