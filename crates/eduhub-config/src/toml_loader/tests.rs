//! Tests for TOML config loading and creation.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_eduhub_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, eduhub_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[api]
base_url = "https://edu.example.vn/api/v1"

[messages]
poll_interval_ms = 1500
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.api.base_url, "https://edu.example.vn/api/v1");
    assert_eq!(config.messages.poll_interval_ms, 1500);
    // Defaults preserved
    assert_eq!(config.api.login_route, "/login");
    assert_eq!(config.logging.level, "eduhub=info");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, eduhub_common::ConfigError::ParseError(_)));
}

#[test]
fn invalid_values_are_returned_with_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[messages]\npoll_interval_ms = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.messages.poll_interval_ms, 0);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eduhub").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8080/api/v1");
    assert_eq!(config.messages.poll_interval_ms, 2000);
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;
    use crate::schema::EduhubConfig;

    let config: EduhubConfig = toml::from_str(&default_config_toml()).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}
