//! Unit tests for config.rs module

use std::sync::Mutex;

use contact_agenda::config::AppConfig;

// Serializes the tests that touch process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_default_config_values() {
    let config = AppConfig::default();

    assert_eq!(config.database.url, "sqlite:data/agenda.db");
    assert_eq!(config.database.max_connections, 4);
    assert_eq!(config.database.connection_timeout_secs, 30);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_default_export_and_photo_config() {
    let config = AppConfig::default();

    assert_eq!(config.export.default_format, "csv");
    assert_eq!(config.export.output_directory, "./output");
    assert_eq!(config.photo.max_bytes, 65_535);
}

#[test]
fn test_config_validation_success() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_config_validation_zero_connection_timeout() {
    let mut config = AppConfig::default();
    config.database.connection_timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_non_sqlite_url() {
    let mut config = AppConfig::default();
    config.database.url = "mysql://root@localhost/agenda".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "invalid".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_valid_log_levels() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        let mut config = AppConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "Failed for level: {}", level);
    }
}

#[test]
fn test_config_validation_invalid_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_invalid_export_format() {
    let mut config = AppConfig::default();
    config.export.default_format = "vcf".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_zero_photo_limit() {
    let mut config = AppConfig::default();
    config.photo.max_bytes = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_serialization_round_trip() {
    let config = AppConfig::default();
    let json = serde_json::to_string(&config).expect("Failed to serialize");
    let back: AppConfig = serde_json::from_str(&json).expect("Failed to deserialize");
    assert_eq!(back.database.url, config.database.url);
    assert_eq!(back.photo.max_bytes, config.photo.max_bytes);
}

#[test]
fn test_load_applies_environment_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("AGENDA__DATABASE__URL", "sqlite:override.db");
    std::env::set_var("AGENDA__PHOTO__MAX_BYTES", "100");
    std::env::set_var("AGENDA_EMAIL", "maria@example.com");

    let loaded = AppConfig::load();

    std::env::remove_var("AGENDA__DATABASE__URL");
    std::env::remove_var("AGENDA__PHOTO__MAX_BYTES");
    std::env::remove_var("AGENDA_EMAIL");

    let config = loaded.expect("Failed to load configuration");
    assert_eq!(config.database.url, "sqlite:override.db");
    assert_eq!(config.photo.max_bytes, 100);
    // CLI credentials share the prefix but not the separator
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.export.default_format, "csv");
}

#[test]
fn test_load_without_overrides_matches_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let config = AppConfig::load().expect("Failed to load configuration");
    assert_eq!(config.database.url, AppConfig::default().database.url);
    assert_eq!(config.photo.max_bytes, 65_535);
}

#[test]
fn test_load_rejects_invalid_override() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("AGENDA__LOGGING__LEVEL", "loud");

    let loaded = AppConfig::load();

    std::env::remove_var("AGENDA__LOGGING__LEVEL");
    assert!(loaded.is_err());
}
