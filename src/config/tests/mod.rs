//! Unit tests for config module
//!
//! Tests configuration types, defaults, parsing and file loading.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use crate::UserSettingsError;
use crate::config::{BusType, Config, LogLevel};
use crate::services::network_settings::{NM_SETTINGS_PATH, SETTINGS_SERVICE};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.bus.bus, BusType::System);
    assert_eq!(config.bus.service_name, SETTINGS_SERVICE);
    assert_eq!(config.bus.settings_path, NM_SETTINGS_PATH);
    assert_eq!(config.secrets.request_timeout(), None);
}

#[test]
fn config_serialize_toml() {
    let config = Config::default();

    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[bus]"));
    assert!(toml_str.contains("service_name = \"org.freedesktop.NetworkManagerUserSettings\""));
}

#[test]
fn config_deserialize_toml() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [bus]
        bus = "session"
        service_name = "org.example.UserSettings"

        [secrets]
        request_timeout_secs = 30
    "#;

    let config = Config::from_toml(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.bus.bus, BusType::Session);
    assert_eq!(config.bus.service_name, "org.example.UserSettings");
    assert_eq!(config.bus.settings_path, NM_SETTINGS_PATH);
    assert_eq!(config.secrets.request_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn zero_timeout_means_wait_forever() {
    let config = Config::from_toml("[secrets]\nrequest_timeout_secs = 0\n").unwrap();

    assert_eq!(config.secrets.request_timeout(), None);
}

#[test]
fn config_invalid_toml() {
    let invalid_toml = r#"
        [general
        invalid syntax here
    "#;

    let result = Config::from_toml(invalid_toml);

    assert!(matches!(result, Err(UserSettingsError::TomlParseError { .. })));
}

#[test]
fn config_rejects_relative_settings_path() {
    let result = Config::from_toml("[bus]\nsettings_path = \"relative/path\"\n");

    assert!(matches!(
        result,
        Err(UserSettingsError::ConfigValidation { ref component, .. }) if component == "bus"
    ));
}

#[test]
fn config_unknown_fields() {
    let toml_with_unknown = r#"
        [general]
        log_level = "warn"
        unknown_field = "should be ignored"

        [unknown_section]
        some_field = "ignored"
    "#;

    let config = Config::from_toml(toml_with_unknown).unwrap();
    assert_eq!(config.general.log_level, LogLevel::Warn);
}

#[test]
fn load_creates_missing_file_with_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/config.toml");

    let config = Config::load(&path).unwrap();

    assert_eq!(config, Config::default());
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# nm-user-settings configuration file"));
    assert_eq!(Config::from_toml(&written).unwrap(), Config::default());
}

#[test]
fn load_reports_file_location_on_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[bus\n").unwrap();

    match Config::load(&path) {
        Err(UserSettingsError::TomlParseError { location, .. }) => {
            assert!(location.ends_with("config.toml"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
