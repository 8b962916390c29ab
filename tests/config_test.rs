use grantview::config::{AppConfig, ConfigManager};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_user_config(config_manager: &ConfigManager, content: &str) {
    config_manager
        .ensure_config_dir()
        .expect("Failed to create config dir");
    fs::write(config_manager.config_path("config.toml"), content)
        .expect("Failed to write config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.display.max_preview_rows, 250);
    assert_eq!(config.display.column_min_width, 10);
    assert_eq!(config.display.column_max_width, 55);
    assert_eq!(config.display.autosize_sample_rows, 40);

    assert_eq!(config.filters.max_options, 100);
    assert_eq!(config.performance.event_poll_interval_ms, 25);

    assert!(!config.debug.enabled);
    assert_eq!(config.debug.log_level, "info");
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[display]"));
    assert!(template.contains("[filters]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
    assert!(template.contains("# Most frequent values offered per filter dropdown"));

    // every setting is commented out, so the template loads as the defaults
    let parsed: AppConfig = toml::from_str(&template).expect("template should parse");
    assert_eq!(parsed.display.max_preview_rows, 250);
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
    assert!(first_path.exists());
}

#[test]
fn test_load_with_no_file_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Should load default config");
    assert_eq!(config.version, "0.1");
    assert_eq!(config.display.max_preview_rows, 250);
}

#[test]
fn test_load_minimal_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r#"
[display]
max_preview_rows = 50

[debug]
log_level = "debug"
"#,
    );

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(config.display.max_preview_rows, 50);
    assert_eq!(config.debug.log_level, "debug");

    // untouched values keep their defaults
    assert_eq!(config.display.column_max_width, 55);
    assert_eq!(config.filters.max_options, 100);
}

#[test]
fn test_load_rejects_bad_values() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r#"
[display]
column_min_width = 60
"#,
    );
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("column_min_width"));
}

#[test]
fn test_load_reports_parse_errors() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[display\nmax_preview_rows = ");
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "1.0".to_string(),
        ..Default::default()
    };

    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unsupported config version"));
}

#[test]
fn test_validate_config_zero_limits() {
    let mut config = AppConfig::default();
    config.filters.max_options = 0;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("max_options must be greater than 0"));

    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("event_poll_interval_ms must be greater than 0"));
}

#[test]
fn test_validate_log_level() {
    let mut config = AppConfig::default();
    config.debug.log_level = "WARN".to_string();
    assert!(config.validate().is_ok());
    config.debug.log_level = "loud".to_string();
    assert!(config.validate().is_err());
}
