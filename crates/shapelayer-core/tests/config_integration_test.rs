//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use serial_test::serial;
use shapelayer_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let file = config_file(
        r#"
data_root = "/from/file"
max_search_results = 4
"#,
    );

    env::set_var("SHAPELAYER_DATA_ROOT", "/from/env");
    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();
    env::remove_var("SHAPELAYER_DATA_ROOT");

    assert_eq!(config.data_root.value, PathBuf::from("/from/env"));
    assert_eq!(config.data_root.source, ConfigSource::Environment);
    assert_eq!(config.max_search_results.value, 4);
    assert_eq!(config.max_search_results.source, ConfigSource::File);
}

#[test]
#[serial]
fn test_invalid_env_value_is_ignored() {
    env::set_var("SHAPELAYER_MAX_POPUP_RESULTS", "zero");
    let config = LayeredConfig::with_defaults().load_from_env();
    env::remove_var("SHAPELAYER_MAX_POPUP_RESULTS");

    assert_eq!(config.max_popup_results.value, 10);
    assert_eq!(config.max_popup_results.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    let file = config_file("radius_damping = 0.5");

    env::set_var("SHAPELAYER_RADIUS_DAMPING", "0.6");
    let mut config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();
    env::remove_var("SHAPELAYER_RADIUS_DAMPING");

    assert_eq!(config.radius_damping.value, 0.6);

    config.update_from_cli(CliConfigOverrides {
        radius_damping: Some(0.9),
        ..Default::default()
    });
    assert_eq!(config.radius_damping.value, 0.9);
    assert_eq!(config.radius_damping.source, ConfigSource::Cli);

    let resolved = config.resolve();
    assert_eq!(resolved.radius_damping, 0.9);
    assert_eq!(resolved.max_search_results, 3);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = config_file("max_search_results = [");
    let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_zero_results_rejected() {
    let file = config_file("max_search_results = 0");
    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}
