//! Unit tests for configuration loading and graceful degradation
//!
//! Covers:
//! - Missing TOML files do not cause termination (defaults + warning)
//! - Malformed TOML files are reported as configuration errors
//! - Overrides (command line / environment) beat file values
//! - Config file path resolution
//!
//! Note: Uses serial_test for the test touching the process environment.

use poi_common::config::{
    resolve_config_path, ConfigOverrides, ConfigSource, TomlConfig, DEFAULT_OVERPASS_URL, DEFAULT_PORT,
};
use poi_common::Error;
use serial_test::serial;
use std::io::Write;
use std::path::{Path, PathBuf};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let path = Path::new("/nonexistent/poi-search/config.toml");
    let (config, source) = TomlConfig::load_or_default(Some(path)).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(source, ConfigSource::Missing(path.to_path_buf()));
}

#[test]
fn test_no_file_falls_back_to_defaults() {
    let (config, source) = TomlConfig::load_or_default(None).unwrap();
    assert_eq!(config.server.port, DEFAULT_PORT);
    assert_eq!(source, ConfigSource::Defaults);
}

#[test]
fn test_file_values_loaded() {
    let file = write_config(
        r#"
        [server]
        port = 9000

        [routing]
        url = "http://osrm.internal:5000"
        profile = "walking"

        [dictionary]
        path = "/srv/poi/categories.csv"
        "#,
    );

    let (config, source) = TomlConfig::load_or_default(Some(file.path())).unwrap();
    assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.routing.url, "http://osrm.internal:5000");
    assert_eq!(config.routing.profile, "walking");
    assert_eq!(
        config.dictionary.path,
        Some(PathBuf::from("/srv/poi/categories.csv"))
    );
    // untouched sections keep compiled defaults
    assert_eq!(config.overpass.url, DEFAULT_OVERPASS_URL);
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("[server\nport = ");
    let result = TomlConfig::load_or_default(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_overrides_beat_file_values() {
    let file = write_config(
        r#"
        [server]
        port = 9000

        [overpass]
        timeout_secs = 20
        "#,
    );

    let overrides = ConfigOverrides {
        port: Some(7000),
        keyword_url: Some("http://ml.internal".to_string()),
        dictionary_path: Some(PathBuf::from("/opt/poi/categories.csv")),
        ..Default::default()
    };

    let (config, _) = TomlConfig::load_or_default(Some(file.path())).unwrap();
    let config = config.with_overrides(overrides);

    assert_eq!(config.server.port, 7000);
    assert_eq!(config.keyword.url, "http://ml.internal");
    assert_eq!(
        config.dictionary.path,
        Some(PathBuf::from("/opt/poi/categories.csv"))
    );
    // not overridden
    assert_eq!(config.overpass.timeout_secs, 20);
}

#[test]
fn test_round_trip_written_config() {
    let mut original = TomlConfig::default();
    original.search.default_radius = 500;
    let file = write_config(&toml::to_string(&original).unwrap());

    let loaded = TomlConfig::load(file.path()).unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn test_explicit_path_wins_resolution() {
    let explicit = PathBuf::from("/tmp/does-not-need-to-exist.toml");
    assert_eq!(resolve_config_path(Some(&explicit)), Some(explicit));
}

#[test]
#[serial]
fn test_resolution_uses_user_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("poi-search");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.toml"), "").unwrap();

    // dirs::config_dir honours XDG_CONFIG_HOME on Linux
    let previous = std::env::var("XDG_CONFIG_HOME").ok();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let resolved = resolve_config_path(None);

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    if cfg!(target_os = "linux") {
        assert_eq!(resolved, Some(app_dir.join("config.toml")));
    }
}
