//! JSON shape of frames and observations exchanged with the dashboard.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use windplay_core::wind::{build_frames, quality_counts, wind_rose};
use windplay_core::{FrameQuality, Observation, PlaybackSpeed, PlaybackStep, WindFrame};

#[test]
fn frame_serializes_with_dashboard_field_names() {
    let datetime = NaiveDate::from_ymd_opt(2024, 2, 1)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .unwrap();
    let frame = WindFrame {
        datetime,
        speed: Some(5.0),
        direction: Some(90.0),
        temperature: None,
        pressure: Some(985.2),
        quality: FrameQuality::GapFilled,
        dx: Some(5.0),
        dy: Some(0.0),
    };
    let value = serde_json::to_value(&frame).unwrap();
    assert_eq!(value["qualityFlag"], "gap_filled");
    assert_eq!(value["datetime"], "2024-02-01T06:00:00");
    assert!(value["temperature"].is_null());

    let back: WindFrame = serde_json::from_value(value).unwrap();
    assert_eq!(back, frame);
}

#[test]
fn observations_tolerate_missing_measurements() {
    let json = r#"[
        {"datetime": "2024-02-01T00:00:00", "speed": 3.5, "direction": 45.0},
        {"datetime": "2024-02-01T02:10:00"}
    ]"#;
    let obs: Vec<Observation> = serde_json::from_str(json).unwrap();
    assert_eq!(obs[1].speed, None);

    let start = obs[0].datetime;
    let end = obs[1].datetime;
    let frames = build_frames(&obs, start, end, PlaybackStep::Hourly).unwrap();
    assert_eq!(frames.len(), 3);
    let counts = quality_counts(&frames);
    assert_eq!((counts.aggregated, counts.gap_filled), (2, 1));
}

#[test]
fn step_and_speed_use_select_labels() {
    assert_eq!(serde_json::to_string(&PlaybackStep::ThreeHourly).unwrap(), "\"3h\"");
    assert_eq!(serde_json::to_string(&PlaybackSpeed::Half).unwrap(), "\"0.5x\"");
    let speed: PlaybackSpeed = serde_json::from_str("\"2\"").unwrap();
    assert_eq!(speed, PlaybackSpeed::Double);
}

#[test]
fn wind_rose_serializes_camel_case() {
    let start = NaiveDate::from_ymd_opt(2024, 2, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    // Blowing from the south, so toward north.
    let obs = vec![Observation::at(start).wind(2.0, 180.0)];
    let end = start + chrono::TimeDelta::minutes(20);
    let frames = build_frames(&obs, start, end, PlaybackStep::TenMinutes).unwrap();
    let value = serde_json::to_value(wind_rose(&frames)).unwrap();

    assert_eq!(value["bins"].as_array().map(Vec::len), Some(16));
    assert_eq!(value["bins"][0]["sector"], "N");
    assert_eq!(value["bins"][0]["totalCount"], 1);
    assert_eq!(value["bins"][0]["speedBuckets"]["calm"], 1);
    assert_eq!(value["dominantSector"], "N");
    assert_eq!(value["directionalConcentration"], 1.0);
    assert_eq!(value["calmShare"], 1.0);
}
