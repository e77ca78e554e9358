#![forbid(unsafe_code)]

//! Wind frame model and frame assembly.
//!
//! Station observations arrive at irregular timestamps and with gaps. Before
//! playback they are aligned onto a fixed [`PlaybackStep`] grid: every slot
//! between the floored start and the requested end produces exactly one
//! [`WindFrame`], so the controller can treat frame index as time.
//!
//! # Invariants
//!
//! 1. Frames are strictly increasing in `datetime`, spaced by `step.delta()`.
//! 2. A slot with no observation repeats the last observed values and is
//!    flagged [`FrameQuality::GapFilled`]; leading empty slots carry no values.
//! 3. `direction` on a frame is the bearing the wind blows *toward*.
//!
//! # Failure Modes
//!
//! - `start >= end`: rejected with [`PlaybackError::InvalidRange`].
//! - Ranges that would exceed [`MAX_PLAYBACK_FRAMES`]: callers should pass the
//!   step through [`PlaybackStep::coerce`] first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// Frame budget for one playback request.
pub const MAX_PLAYBACK_FRAMES: usize = 1500;

// ---------------------------------------------------------------------------
// Step grid
// ---------------------------------------------------------------------------

/// Spacing between consecutive playback frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaybackStep {
    /// Raw 10-minute observations.
    #[cfg_attr(feature = "serde", serde(rename = "10m"))]
    TenMinutes,
    /// Hourly aggregates.
    #[cfg_attr(feature = "serde", serde(rename = "1h"))]
    Hourly,
    /// Three-hour aggregates.
    #[cfg_attr(feature = "serde", serde(rename = "3h"))]
    ThreeHourly,
    /// Daily aggregates.
    #[cfg_attr(feature = "serde", serde(rename = "1d"))]
    Daily,
}

impl PlaybackStep {
    /// Wire label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TenMinutes => "10m",
            Self::Hourly => "1h",
            Self::ThreeHourly => "3h",
            Self::Daily => "1d",
        }
    }

    /// Time between two frames.
    #[must_use]
    pub fn delta(self) -> TimeDelta {
        match self {
            Self::TenMinutes => TimeDelta::minutes(10),
            Self::Hourly => TimeDelta::hours(1),
            Self::ThreeHourly => TimeDelta::hours(3),
            Self::Daily => TimeDelta::days(1),
        }
    }

    /// Align `value` down to the start of its slot.
    #[must_use]
    pub fn floor(self, value: NaiveDateTime) -> NaiveDateTime {
        let (hour, minute) = match self {
            Self::TenMinutes => (value.hour(), value.minute() / 10 * 10),
            Self::Hourly => (value.hour(), 0),
            Self::ThreeHourly => (value.hour() / 3 * 3, 0),
            Self::Daily => (0, 0),
        };
        NaiveTime::from_hms_opt(hour, minute, 0).map_or(value, |t| value.date().and_time(t))
    }

    /// Frames needed to cover `[start, end]` at this step.
    #[must_use]
    pub fn frame_count(self, start: NaiveDateTime, end: NaiveDateTime) -> usize {
        if end <= start {
            return 0;
        }
        let span = (end - start).num_seconds();
        let step = self.delta().num_seconds();
        usize::try_from(span / step).map_or(usize::MAX, |n| n.saturating_add(1))
    }

    /// Next coarser step, if any.
    #[must_use]
    pub fn coarser(self) -> Option<Self> {
        match self {
            Self::TenMinutes => Some(Self::Hourly),
            Self::Hourly => Some(Self::ThreeHourly),
            Self::ThreeHourly => Some(Self::Daily),
            Self::Daily => None,
        }
    }

    /// Coarsen until the range fits in [`MAX_PLAYBACK_FRAMES`].
    ///
    /// Daily is returned even if it still exceeds the budget.
    #[must_use]
    pub fn coerce(self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let mut candidate = self;
        while candidate.frame_count(start, end) > MAX_PLAYBACK_FRAMES {
            match candidate.coarser() {
                Some(next) => candidate = next,
                None => break,
            }
        }
        candidate
    }
}

impl fmt::Display for PlaybackStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlaybackStep {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "10m" => Ok(Self::TenMinutes),
            "1h" => Ok(Self::Hourly),
            "3h" => Ok(Self::ThreeHourly),
            "1d" => Ok(Self::Daily),
            _ => Err(PlaybackError::UnknownStep(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Observations and frames
// ---------------------------------------------------------------------------

/// One station measurement, as delivered by the data source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Local timestamp.
    pub datetime: NaiveDateTime,
    /// Wind speed in m/s.
    #[cfg_attr(feature = "serde", serde(default))]
    pub speed: Option<f64>,
    /// Bearing the wind blows *from*, in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub direction: Option<f64>,
    /// Air temperature in °C.
    #[cfg_attr(feature = "serde", serde(default))]
    pub temperature: Option<f64>,
    /// Pressure in hPa.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pressure: Option<f64>,
}

impl Observation {
    /// Observation with only a timestamp.
    #[must_use]
    pub fn at(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            speed: None,
            direction: None,
            temperature: None,
            pressure: None,
        }
    }

    /// Set wind speed and source bearing (builder pattern).
    #[must_use]
    pub fn wind(mut self, speed: f64, direction_from: f64) -> Self {
        self.speed = Some(speed);
        self.direction = Some(direction_from);
        self
    }

    /// Set temperature and pressure (builder pattern).
    #[must_use]
    pub fn air(mut self, temperature: f64, pressure: f64) -> Self {
        self.temperature = Some(temperature);
        self.pressure = Some(pressure);
        self
    }
}

/// Provenance of a frame's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FrameQuality {
    /// Raw observation in its own slot.
    Observed,
    /// Aggregate covering the slot.
    Aggregated,
    /// Repeated from the previous observed slot.
    GapFilled,
}

impl FrameQuality {
    /// Wire label (`observed`, `aggregated`, `gap_filled`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::Aggregated => "aggregated",
            Self::GapFilled => "gap_filled",
        }
    }
}

/// One playback frame: station conditions at a grid timestamp.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WindFrame {
    /// Slot start.
    pub datetime: NaiveDateTime,
    /// Wind speed in m/s.
    pub speed: Option<f64>,
    /// Bearing the wind blows *toward*, in degrees.
    pub direction: Option<f64>,
    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Pressure in hPa.
    pub pressure: Option<f64>,
    /// Where the values came from.
    #[cfg_attr(feature = "serde", serde(rename = "qualityFlag"))]
    pub quality: FrameQuality,
    /// East component of the wind vector.
    pub dx: Option<f64>,
    /// North component of the wind vector.
    pub dy: Option<f64>,
}

/// Per-quality frame tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub struct QualityCounts {
    pub observed: usize,
    pub aggregated: usize,
    pub gap_filled: usize,
}

impl QualityCounts {
    /// Total frames counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.observed + self.aggregated + self.gap_filled
    }
}

/// Count frames per quality flag.
#[must_use]
pub fn quality_counts(frames: &[WindFrame]) -> QualityCounts {
    frames.iter().fold(QualityCounts::default(), |mut acc, f| {
        match f.quality {
            FrameQuality::Observed => acc.observed += 1,
            FrameQuality::Aggregated => acc.aggregated += 1,
            FrameQuality::GapFilled => acc.gap_filled += 1,
        }
        acc
    })
}

// ---------------------------------------------------------------------------
// Wind rose
// ---------------------------------------------------------------------------

/// Compass sectors, clockwise from north, 22.5° wide and centred on their bearing.
pub const WIND_ROSE_SECTORS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Upper bounds (m/s, exclusive) of the calm, breeze and strong buckets.
const SPEED_BUCKET_LIMITS: [f64; 3] = [3.0, 8.0, 12.0];

/// Sample counts per speed bucket within one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeedBuckets {
    /// Below 3 m/s.
    pub calm: usize,
    /// 3 to 8 m/s.
    pub breeze: usize,
    /// 8 to 12 m/s.
    pub strong: usize,
    /// 12 m/s and above.
    pub gale: usize,
}

/// One compass sector of the rose.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WindRoseBin {
    pub sector: String,
    pub speed_buckets: SpeedBuckets,
    pub total_count: usize,
}

/// Directional distribution of the wind over a playback window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WindRoseSummary {
    /// Always [`WIND_ROSE_SECTORS`].len() bins, in sector order.
    pub bins: Vec<WindRoseBin>,
    /// Sector with the most samples; first one wins ties.
    pub dominant_sector: Option<String>,
    /// Share of samples in the dominant sector, 3 decimals.
    pub directional_concentration: Option<f64>,
    /// Share of samples below 3 m/s, 3 decimals.
    pub calm_share: Option<f64>,
}

/// Sector index for a toward bearing.
#[must_use]
pub fn rose_sector(direction: f64) -> usize {
    let shifted = (direction + 11.25).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    ((shifted / 22.5) as usize) % WIND_ROSE_SECTORS.len()
}

/// Bucket the frames by toward bearing and speed.
///
/// Gap-filled frames repeat an earlier sample and are skipped, as are frames
/// missing speed or direction.
#[must_use]
pub fn wind_rose(frames: &[WindFrame]) -> WindRoseSummary {
    let mut bins: Vec<WindRoseBin> = WIND_ROSE_SECTORS
        .iter()
        .map(|sector| WindRoseBin {
            sector: (*sector).to_string(),
            speed_buckets: SpeedBuckets::default(),
            total_count: 0,
        })
        .collect();

    let mut samples = 0usize;
    let mut calm = 0usize;
    for frame in frames.iter().filter(|f| f.quality != FrameQuality::GapFilled) {
        let (Some(speed), Some(direction)) = (frame.speed, frame.direction) else {
            continue;
        };
        if !speed.is_finite() || !direction.is_finite() {
            continue;
        }
        let bin = &mut bins[rose_sector(direction)];
        let buckets = &mut bin.speed_buckets;
        if speed < SPEED_BUCKET_LIMITS[0] {
            buckets.calm += 1;
            calm += 1;
        } else if speed < SPEED_BUCKET_LIMITS[1] {
            buckets.breeze += 1;
        } else if speed < SPEED_BUCKET_LIMITS[2] {
            buckets.strong += 1;
        } else {
            buckets.gale += 1;
        }
        bin.total_count += 1;
        samples += 1;
    }

    let dominant = bins
        .iter()
        .fold(None::<&WindRoseBin>, |best, bin| match best {
            Some(b) if b.total_count >= bin.total_count => Some(b),
            _ => Some(bin),
        })
        .filter(|bin| bin.total_count > 0);
    let share = |count: usize| (samples > 0).then(|| round_to(count as f64 / samples as f64, 3));

    WindRoseSummary {
        dominant_sector: dominant.map(|bin| bin.sector.clone()),
        directional_concentration: dominant.and_then(|bin| share(bin.total_count)),
        calm_share: share(calm),
        bins,
    }
}

// ---------------------------------------------------------------------------
// Math helpers
// ---------------------------------------------------------------------------

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Convert a meteorological "from" bearing to the bearing the wind blows toward.
#[must_use]
pub fn toward_direction(direction_from: Option<f64>) -> Option<f64> {
    direction_from
        .filter(|d| d.is_finite())
        .map(|d| round_to((d + 180.0).rem_euclid(360.0), 3))
}

/// East/north vector components for a speed and a toward bearing.
#[must_use]
pub fn vector_components(speed: Option<f64>, direction: Option<f64>) -> (Option<f64>, Option<f64>) {
    let (Some(speed), Some(direction)) = (speed, direction) else {
        return (None, None);
    };
    let rad = direction.rem_euclid(360.0).to_radians();
    (
        Some(round_to(speed * rad.sin(), 4)),
        Some(round_to(speed * rad.cos(), 4)),
    )
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0u32), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| round_to(sum / f64::from(n), 3))
}

/// Circular mean of bearings in degrees; `None` when empty or cancelling out.
#[must_use]
pub fn mean_angle(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (x, y, n) = values.fold((0.0, 0.0, 0u32), |(x, y, n), a| {
        let rad = a.to_radians();
        (x + rad.cos(), y + rad.sin(), n + 1)
    });
    if n == 0 || (x == 0.0 && y == 0.0) {
        return None;
    }
    let angle = round_to(y.atan2(x).to_degrees().rem_euclid(360.0), 3);
    Some(if angle >= 360.0 { 0.0 } else { angle })
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Average observations falling into the same slot.
///
/// Scalars use the arithmetic mean; bearings use the circular mean. The
/// result is sorted by slot start and stamped with it.
#[must_use]
pub fn aggregate_observations(observations: &[Observation], step: PlaybackStep) -> Vec<Observation> {
    let mut slots: BTreeMap<NaiveDateTime, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        slots.entry(step.floor(obs.datetime)).or_default().push(obs);
    }
    slots
        .into_iter()
        .map(|(datetime, points)| Observation {
            datetime,
            speed: mean(points.iter().filter_map(|p| p.speed)),
            direction: mean_angle(points.iter().filter_map(|p| p.direction)),
            temperature: mean(points.iter().filter_map(|p| p.temperature)),
            pressure: mean(points.iter().filter_map(|p| p.pressure)),
        })
        .collect()
}

/// Align observations onto the step grid covering `[floor(start), end]`.
pub fn build_frames(
    observations: &[Observation],
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: PlaybackStep,
) -> Result<Vec<WindFrame>, PlaybackError> {
    if start >= end {
        return Err(PlaybackError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    // Later observations in the same slot win.
    let by_slot: BTreeMap<NaiveDateTime, &Observation> = observations
        .iter()
        .map(|obs| (step.floor(obs.datetime), obs))
        .collect();

    let slot_quality = if step == PlaybackStep::TenMinutes {
        FrameQuality::Observed
    } else {
        FrameQuality::Aggregated
    };

    let mut frames = Vec::with_capacity(step.frame_count(start, end));
    let mut last_observed: Option<&Observation> = None;
    let mut cursor = step.floor(start);
    while cursor <= end {
        let (matched, quality) = match by_slot.get(&cursor) {
            Some(obs) => {
                last_observed = Some(obs);
                (Some(*obs), slot_quality)
            }
            None => (last_observed, FrameQuality::GapFilled),
        };

        let speed = matched.and_then(|m| m.speed);
        let direction = toward_direction(matched.and_then(|m| m.direction));
        let (dx, dy) = vector_components(speed, direction);
        frames.push(WindFrame {
            datetime: cursor,
            speed,
            direction,
            temperature: matched.and_then(|m| m.temperature),
            pressure: matched.and_then(|m| m.pressure),
            quality,
            dx,
            dy,
        });

        match cursor.checked_add_signed(step.delta()) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        step = step.label(),
        frames = frames.len(),
        observations = observations.len(),
        "assembled playback frames"
    );

    Ok(frames)
}
