//! End-to-end: configuration → manager → composers → JSON lines on disk.

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use logcore::composer::{format_amount_f64, AuditLogger, ErrorLogger, PerformanceLogger, TransferRecord};
use logcore::config::{parse_config, LoggingConfig, SamplingConfig};
use logcore::logging::{BufferWriter, Level, LoggerManager};
use logcore::monitor::{AlertThreshold, ErrorMonitor};
use logcore::{ErrorCategory, ErrorContext, LoggingError};
use rust_decimal::Decimal;

mod common;

fn file_config(dir: &std::path::Path) -> LoggingConfig {
    LoggingConfig {
        output: "file".into(),
        directory: dir.to_path_buf(),
        local_time: false,
        ..Default::default()
    }
}

#[test]
fn test_records_land_in_daily_file_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LoggerManager::new(file_config(dir.path())).unwrap();
    let base = manager.logger();

    let request = base.with_request_id("req-42").with_user("u-7", "user@example.com");
    let audit = AuditLogger::new(request.clone());
    audit.log_transfer(&TransferRecord {
        transfer_id: "tr-1",
        user_id: "u-7",
        from_account: "acc-1",
        to_account: "acc-2",
        amount: Decimal::new(25000, 2),
        currency: "EUR",
        success: true,
        reason: "",
    });
    PerformanceLogger::new(request).log_http_request(
        "POST",
        "/transfers",
        201,
        Duration::from_millis(40),
        128,
    );
    base.info().field("plain", true).msg("unscoped");
    manager.sync().unwrap();

    let lines = common::json_lines(&manager.current_file().unwrap());
    assert_eq!(lines.len(), 3);

    let transfer = &lines[0];
    assert_eq!(transfer["log_type"], "audit");
    assert_eq!(transfer["amount"], "250.00");
    assert_eq!(transfer["request_id"], "req-42");
    assert_eq!(transfer["user_email"], "user@example.com");
    let ts = transfer["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "timestamp {}", ts);
    assert_eq!(ts.split('.').nth(1).unwrap().len(), "000000+00:00".len());

    assert_eq!(lines[1]["log_type"], "performance");
    assert_eq!(lines[1]["request_id"], "req-42");
    assert!(lines[2].get("request_id").is_none());

    manager.close().unwrap();
}

#[test]
fn test_error_logger_with_monitor_writes_alert_to_same_output() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LoggerManager::new(file_config(dir.path())).unwrap();
    let monitor = Arc::new(ErrorMonitor::new(manager.config().monitor.clone(), manager.logger()));
    monitor.add_threshold(AlertThreshold::new(ErrorCategory::Database, 3, Duration::from_secs(60)));
    let errors = ErrorLogger::new(manager.logger()).with_monitor(monitor);

    let err = std::io::Error::new(std::io::ErrorKind::Other, "deadlock detected");
    for _ in 0..3 {
        errors.log_database_error(
            ErrorContext::new(ErrorCategory::Database, "ledger", "post_entry"),
            "insert",
            "entries",
            &err,
        );
    }
    manager.sync().unwrap();

    let lines = common::json_lines(&manager.current_file().unwrap());
    let types: Vec<_> = lines.iter().map(|l| l["log_type"].as_str().unwrap().to_string()).collect();
    assert_eq!(types, vec!["error", "error", "error", "alert"]);
    assert_eq!(lines[3]["count"], 3);
}

#[test]
fn test_amount_rendering() {
    assert_eq!(format_amount_f64(100.005), "100.01");
    assert_eq!(format_amount_f64(0.01), "0.01");
}

#[test]
fn test_config_from_toml_drives_manager() {
    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        r#"
level = "warn"
format = "json"
output = "file"
directory = "{}"
max_backups = 3
compress = false

[sampling]
enabled = false
"#,
        dir.path().join("logs").display()
    );
    let config = parse_config(&toml).unwrap();
    let manager = LoggerManager::new(config).unwrap();

    manager.logger().info().msg("below level");
    manager.logger().warn().msg("kept");
    manager.sync().unwrap();

    let lines = common::json_lines(&manager.current_file().unwrap());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["message"], "kept");
    assert_eq!(manager.level(), Level::Warn);
}

#[test]
fn test_all_validation_errors_reported() {
    let config = LoggingConfig {
        level: "loud".into(),
        format: "yaml".into(),
        output: "printer".into(),
        ..Default::default()
    };
    let err = LoggerManager::new(config).unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, LoggingError::Config(_)));
    assert!(msg.contains("loud") && msg.contains("yaml") && msg.contains("printer"), "{}", msg);
}

#[test]
fn test_sampling_thins_info_but_keeps_warnings() {
    let buf = BufferWriter::new();
    let config = LoggingConfig {
        sampling: SamplingConfig {
            enabled: true,
            initial: 5,
            thereafter: 1000,
        },
        ..Default::default()
    };
    let manager = LoggerManager::with_writer(config, Arc::new(buf.clone())).unwrap();
    let logger = manager.logger();

    for i in 0..50 {
        logger.info().field("i", i).msg("tick");
    }
    for _ in 0..10 {
        logger.warn().msg("pressure");
    }

    let lines = buf.json_lines();
    let infos = lines.iter().filter(|l| l["level"] == "info").count();
    let warns = lines.iter().filter(|l| l["level"] == "warn").count();
    assert!(infos >= 5 && infos < 50, "kept {} info records", infos);
    assert_eq!(warns, 10);
}

#[test]
fn test_tracing_events_are_bridged() {
    let buf = BufferWriter::new();
    let manager = LoggerManager::with_writer(LoggingConfig::default(), Arc::new(buf.clone())).unwrap();

    let subscriber = {
        use tracing_subscriber::layer::SubscriberExt;
        tracing_subscriber::registry().with(manager.tracing_layer())
    };
    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(attempt = 2, "Upstream slow");
    });

    let lines = buf.json_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["message"], "Upstream slow");
    assert_eq!(lines[0]["attempt"], 2);
}

#[test]
fn test_health_check_after_close_fails() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LoggerManager::new(file_config(dir.path())).unwrap();
    manager.health_check().unwrap();
    manager.close().unwrap();
    assert!(matches!(manager.health_check(), Err(LoggingError::HealthCheck(_))));
}
