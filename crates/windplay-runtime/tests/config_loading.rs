//! File-based config loading: extension dispatch, validation, error mapping.

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use windplay_core::PlaybackSpeed;
use windplay_runtime::{ConfigError, LogFormat, PlaybackConfig};

fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(body.as_bytes()).expect("write temp file");
    file
}

#[test]
fn toml_file_round_trips_into_options() {
    let file = write_temp(
        ".toml",
        r#"
base_step_ms = 800
speed = "2x"
looping = true

[log]
level = "debug"
format = "pretty"
"#,
    );
    let cfg = PlaybackConfig::load_validated(file.path()).unwrap();
    assert_eq!(cfg.base_step_ms, 800);
    assert_eq!(cfg.speed, PlaybackSpeed::Double);
    assert_eq!(cfg.log.format, LogFormat::Pretty);

    let options = cfg.playback_options().unwrap();
    assert_eq!(options.frame_delay(), Duration::from_millis(400));
    assert!(options.looping());
}

#[test]
fn json_file_loads() {
    let file = write_temp(".json", r#"{"speed": "0.5x", "looping": false}"#);
    let cfg = PlaybackConfig::load_validated(file.path()).unwrap();
    assert_eq!(cfg.speed, PlaybackSpeed::Half);
    assert_eq!(
        cfg.playback_options().unwrap().frame_delay(),
        Duration::from_millis(2000)
    );
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let file = write_temp(".toml", "base_step_ms = 0\n");
    match PlaybackConfig::load_validated(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors, vec!["base_step_ms must be > 0".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unknown_extension_is_rejected() {
    let file = write_temp(".yaml", "speed: 1x\n");
    assert!(matches!(
        PlaybackConfig::load_validated(file.path()),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        PlaybackConfig::load_validated(&path),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn malformed_toml_is_parse_error() {
    let file = write_temp(".toml", "speed = [\n");
    let err = PlaybackConfig::load_validated(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
    assert!(err.to_string().starts_with("TOML parse error"));
}
