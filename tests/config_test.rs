//! Integration tests for configuration loading

use rust_decimal_macros::dec;
use xau_trader::config::{Config, ExecutionMode};
use xau_trader::telemetry::LogFormat;

#[test]
fn test_bundled_example_matches_defaults() {
    let config: Config = toml::from_str(include_str!("../config.toml.example")).unwrap();
    config.validate().unwrap();

    let defaults = Config::default();
    assert_eq!(config.instrument.symbol, defaults.instrument.symbol);
    assert_eq!(config.feed.url, defaults.feed.url);
    assert_eq!(config.risk.default_lot, dec!(0.01));
    assert_eq!(config.risk.partial_close_pct, dec!(0.8));
    assert_eq!(config.execution.mode, ExecutionMode::Paper);
    assert_eq!(config.scheduler.sessions, defaults.scheduler.sessions);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert_eq!(config.position_params(), defaults.position_params());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
            [risk]
            default_lot = 0.05

            [scheduler]
            sessions = []
        "#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.risk.default_lot, dec!(0.05));
    assert!(config.scheduler.sessions.is_empty());
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[risk]\npartial_close_pct = 0\n").unwrap();
    assert!(Config::load(&path).is_err());
}
