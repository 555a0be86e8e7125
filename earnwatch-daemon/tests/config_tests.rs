//! Configuration loading and validation tests.
//!
//! Tests TOML parsing, file loading, partial configs, and validation
//! from the daemon's point of view.

use earnwatch_core::config::EarnwatchConfig;
use earnwatch_ingest::EngineConfig;

#[test]
fn test_parse_full_config() {
    // Given: A complete TOML config
    let toml_str = r#"
[general]
log_level = "debug"
log_format = "json"
data_dir = "/var/lib/earnwatch"

[ingest]
log_dir = "/srv/salad/logs"
extensions = ["txt"]
excluded_dirs = ["archive", "crash"]
bandwidth_dir_prefix = "Bandwidth-SGS-"
general_window = 10
bandwidth_window = 3
error_window = 15
general_capacity = 12
bandwidth_capacity = 3
bandwidth_divisor = 7500000.0
persist_state = true
reset_state_on_start = false

[server]
bind_addr = "0.0.0.0:8000"
static_dir = "/usr/share/earnwatch"
cors_allow_any = false

[metrics]
enabled = true
listen_addr = "127.0.0.1"
port = 9200
endpoint = "/metrics"
"#;

    // When: Parsing config
    let config = EarnwatchConfig::parse(toml_str).expect("full config should parse");
    config.validate().expect("full config should validate");

    // Then: Every section is populated
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.ingest.excluded_dirs, vec!["archive", "crash"]);
    assert_eq!(config.ingest.general_capacity, 12);
    assert_eq!(config.server.static_dir.as_deref(), Some("/usr/share/earnwatch"));
    assert!(!config.server.cors_allow_any);
    assert_eq!(config.metrics.port, 9200);

    // And: The engine sees the same values
    let engine = EngineConfig::from_core(&config);
    assert_eq!(engine.general_window, 10);
    assert_eq!(engine.bandwidth_window, 3);
    assert_eq!(
        engine.state_dir.as_deref(),
        Some(std::path::Path::new("/var/lib/earnwatch"))
    );
}

#[test]
fn test_partial_config_uses_defaults() {
    let config = EarnwatchConfig::parse("[ingest]\nlog_dir = \"/tmp/logs\"\n").unwrap();
    assert_eq!(config.ingest.log_dir, "/tmp/logs");
    assert_eq!(config.ingest.general_window, 20);
    assert_eq!(config.ingest.bandwidth_window, 5);
    assert_eq!(config.server.bind_addr, "127.0.0.1:8000");
}

#[test]
fn test_capacity_below_window_is_rejected() {
    let config =
        EarnwatchConfig::parse("[ingest]\ngeneral_window = 10\ngeneral_capacity = 5\n").unwrap();
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("earnwatch.toml");
    let mut config = EarnwatchConfig::default();
    config.ingest.error_window = 7;
    std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

    let loaded = EarnwatchConfig::from_file(&path).await.unwrap();
    assert_eq!(loaded.ingest.error_window, 7);
}

#[tokio::test]
async fn test_invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("earnwatch.toml");
    std::fs::write(&path, "[general]\nlog_level = \"loud\"\n").unwrap();

    assert!(EarnwatchConfig::from_file(&path).await.is_err());
}
