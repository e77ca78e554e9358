use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use serde::Serialize;
use windplay_core::wind::{aggregate_observations, build_frames, quality_counts, wind_rose};
use windplay_core::{Observation, PlaybackStep, QualityCounts, WindRoseSummary};
use windplay_runtime::{LogConfig, LogFormat};

use crate::error::Result;
use crate::{install_logging, read_json};

#[derive(Debug, Clone, Args)]
pub struct FramesArgs {
    /// JSON array of station observations.
    pub observations: PathBuf,

    /// Window start (`YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]`).
    #[arg(long, value_parser = parse_datetime)]
    pub start: NaiveDateTime,

    /// Window end, inclusive.
    #[arg(long, value_parser = parse_datetime)]
    pub end: NaiveDateTime,

    /// Requested grid step (10m, 1h, 3h, 1d). Coarsened when the window
    /// would exceed the frame limit.
    #[arg(long, default_value = "10m")]
    pub step: PlaybackStep,

    /// Print only the step, per-quality counts and the wind rose.
    #[arg(long)]
    pub summary: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Serialize)]
struct FramesSummary {
    step: PlaybackStep,
    requested_step: PlaybackStep,
    frames: usize,
    quality: QualityCounts,
    wind_rose: WindRoseSummary,
}

/// Accept a date, or a date-time with minute or second precision.
pub fn parse_datetime(value: &str) -> std::result::Result<NaiveDateTime, String> {
    let value = value.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid date/time: {value}"))
}

pub fn run_frames(
    args: &FramesArgs,
    log_format: Option<LogFormat>,
    out: &mut impl Write,
) -> Result<()> {
    install_logging(LogConfig::default(), log_format)?;

    let observations: Vec<Observation> = read_json(&args.observations)?;
    let step = args.step.coerce(args.start, args.end);
    if step != args.step {
        tracing::info!(
            requested = args.step.label(),
            step = step.label(),
            "coarsened playback step to stay within frame limit"
        );
    }

    let frames = if step == PlaybackStep::TenMinutes {
        build_frames(&observations, args.start, args.end, step)?
    } else {
        let aggregated = aggregate_observations(&observations, step);
        build_frames(&aggregated, args.start, args.end, step)?
    };

    if args.summary {
        let summary = FramesSummary {
            step,
            requested_step: args.step,
            frames: frames.len(),
            quality: quality_counts(&frames),
            wind_rose: wind_rose(&frames),
        };
        write_json(out, &summary, args.pretty)?;
    } else {
        write_json(out, &frames, args.pretty)?;
    }
    Ok(())
}

fn write_json(out: &mut impl Write, value: &impl Serialize, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
