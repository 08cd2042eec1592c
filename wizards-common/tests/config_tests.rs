//! Tests for configuration loading and tier resolution
//!
//! Uses serial_test because several tests set WIZARDS_* environment
//! variables, which are process-global.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use wizards_common::config::{
    CliOverrides, CompiledDefaults, ConfigSource, Settings, TomlConfig, ENV_DATABASE_PATH, ENV_HOST,
    ENV_LOG_LEVEL, ENV_PORT,
};

fn clear_env() {
    for key in [ENV_DATABASE_PATH, ENV_HOST, ENV_PORT, ENV_LOG_LEVEL] {
        env::remove_var(key);
    }
}

fn defaults() -> CompiledDefaults {
    CompiledDefaults {
        database_path: PathBuf::from("/var/lib/wizards/default.db"),
        host: "127.0.0.1".to_string(),
        port: 5780,
        log_level: "info".to_string(),
    }
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(defaults.database_path.ends_with("wizards.db"));
    assert_eq!(defaults.host, "127.0.0.1");
    assert_eq!(defaults.port, 5780);
    assert_eq!(defaults.log_level, "info");
}

#[test]
fn test_parse_full_toml() {
    let config = TomlConfig::from_toml_str(
        r#"
        database_path = "/srv/wizards/reviews.db"

        [server]
        host = "0.0.0.0"
        port = 8080

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(config.database_path, Some(PathBuf::from("/srv/wizards/reviews.db")));
    assert_eq!(config.server.host.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.server.port, Some(8080));
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
}

#[test]
fn test_parse_empty_toml_uses_no_overrides() {
    let config = TomlConfig::from_toml_str("").unwrap();
    assert!(config.database_path.is_none());
    assert!(config.server.port.is_none());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let result = TomlConfig::from_toml_str("[server\nport = ");
    assert!(matches!(result, Err(wizards_common::Error::Config(_))));
}

#[test]
fn test_missing_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let result = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\nport = 9001\n").unwrap();

    let config = TomlConfig::load(&path).unwrap().unwrap();
    assert_eq!(config.server.port, Some(9001));
}

#[test]
#[serial]
fn test_merge_falls_back_to_defaults() {
    clear_env();

    let settings =
        Settings::merge(&CliOverrides::default(), &TomlConfig::default(), &defaults()).unwrap();

    assert_eq!(settings.database_path, PathBuf::from("/var/lib/wizards/default.db"));
    assert_eq!(settings.bind_address(), "127.0.0.1:5780");
    assert_eq!(settings.log_level, "info");
}

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();

    let toml_config = TomlConfig::from_toml_str("[server]\nport = 6000\n").unwrap();
    let settings = Settings::merge(&CliOverrides::default(), &toml_config, &defaults()).unwrap();

    assert_eq!(settings.port, 6000);
    assert_eq!(settings.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_PORT, "7000");
    env::set_var(ENV_DATABASE_PATH, "/tmp/wizards-env.db");

    let toml_config = TomlConfig::from_toml_str(
        "database_path = \"/tmp/wizards-toml.db\"\n[server]\nport = 6000\n",
    )
    .unwrap();
    let settings = Settings::merge(&CliOverrides::default(), &toml_config, &defaults()).unwrap();

    assert_eq!(settings.port, 7000);
    assert_eq!(settings.database_path, PathBuf::from("/tmp/wizards-env.db"));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_PORT, "7000");
    env::set_var(ENV_LOG_LEVEL, "warn");

    let cli = CliOverrides {
        port: Some(8000),
        log_level: Some("trace".to_string()),
        ..Default::default()
    };
    let settings = Settings::merge(&cli, &TomlConfig::default(), &defaults()).unwrap();

    assert_eq!(settings.port, 8000);
    assert_eq!(settings.log_level, "trace");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_port_is_config_error() {
    clear_env();
    env::set_var(ENV_PORT, "not-a-port");

    let result = Settings::merge(&CliOverrides::default(), &TomlConfig::default(), &defaults());
    assert!(matches!(result, Err(wizards_common::Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_explicit_missing_config_path_is_error() {
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let cli = CliOverrides {
        config_path: Some(dir.path().join("nope.toml")),
        ..Default::default()
    };

    assert!(matches!(
        Settings::resolve(&cli),
        Err(wizards_common::Error::Config(_))
    ));
}

#[test]
#[serial]
fn test_explicit_config_file_is_reported_as_source() {
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wizards.toml");
    std::fs::write(&path, "[server]\nport = 6100\n").unwrap();
    let cli = CliOverrides {
        config_path: Some(path.clone()),
        ..Default::default()
    };

    let (settings, source) = Settings::resolve(&cli).unwrap();
    assert_eq!(settings.port, 6100);
    assert_eq!(source, ConfigSource::File(path));
}
