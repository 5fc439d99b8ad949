//! Configuration loading and precedence tests

use pretty_assertions::assert_eq;
use semtest_config::{ConfigError, ConfigLoader, Settings};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> PathBuf {
    let config_path = dir.join("semtest.toml");
    fs::write(&config_path, content).unwrap();
    config_path
}

const ENV_KEYS: [&str; 5] = [
    "SEMTEST_VERBOSE",
    "SEMTEST_REASONING",
    "SEMTEST_DELAY_MS",
    "SEMTEST_DRAIN_MS",
    "NO_COLOR",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_load_suite_config_basic() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(
        temp_dir.path(),
        r#"
[suite]
verbose = true
drain_ms = 0
"#,
    );

    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert_eq!(config.source(), Some(path.as_path()));
    let settings = config.settings();
    assert!(settings.verbose);
    assert_eq!(settings.drain_ms, 0);
    assert!(!settings.reasoning);
}

#[test]
fn test_load_when_no_config_exists() {
    let temp_dir = TempDir::new().unwrap();

    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert_eq!(config.settings(), Settings::default());
}

#[test]
fn test_load_from_subdirectory_finds_parent() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[reasoning]\nenabled = true\n");

    let nested = temp_dir.path().join("suites").join("core");
    fs::create_dir_all(&nested).unwrap();

    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(&nested)
        .unwrap();

    assert!(config.settings().reasoning);
    assert_eq!(
        config.source(),
        Some(temp_dir.path().join("semtest.toml").as_path())
    );
}

#[test]
fn test_nearest_config_wins() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[suite]\ndelay_ms = 10\n");
    let nested = temp_dir.path().join("inner");
    fs::create_dir_all(&nested).unwrap();
    create_config_file(&nested, "[suite]\ndelay_ms = 20\n");

    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(&nested)
        .unwrap();

    assert_eq!(config.settings().delay_ms, 20);
}

#[test]
fn test_invalid_toml_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[suite\nverbose = true\n");

    let result = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path());

    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

#[test]
fn test_invalid_extension_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[suite]\nextension = \".sem\"\n");

    let result = ConfigLoader::new().without_env().load_from_file(&path);

    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_load_from_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    let result = ConfigLoader::new()
        .without_env()
        .load_from_file(&temp_dir.path().join("absent.toml"));

    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

// ============================================================================
// Environment Override Tests
// ============================================================================

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        r#"
[suite]
verbose = false
delay_ms = 100

[output]
color = true
"#,
    );

    env::set_var("SEMTEST_VERBOSE", "true");
    env::set_var("SEMTEST_DELAY_MS", "5");
    env::set_var("NO_COLOR", "1");

    let result = ConfigLoader::new().load_from_directory(temp_dir.path());
    clear_env();

    let settings = result.unwrap().settings();
    assert!(settings.verbose);
    assert_eq!(settings.delay_ms, 5);
    assert!(!settings.color);
}

#[test]
#[serial]
fn test_env_without_config_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    env::set_var("SEMTEST_REASONING", "yes");
    env::set_var("SEMTEST_DRAIN_MS", "0");

    let result = ConfigLoader::new().load_from_directory(temp_dir.path());
    clear_env();

    let settings = result.unwrap().settings();
    assert!(settings.reasoning);
    assert_eq!(settings.drain_ms, 0);
}

#[test]
#[serial]
fn test_invalid_env_value_is_an_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    env::set_var("SEMTEST_DELAY_MS", "a while");

    let result = ConfigLoader::new().load_from_directory(temp_dir.path());
    clear_env();

    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
#[serial]
fn test_without_env_ignores_variables() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    env::set_var("SEMTEST_VERBOSE", "true");

    let result = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path());
    clear_env();

    assert!(!result.unwrap().settings().verbose);
}
