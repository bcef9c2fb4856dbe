//! Integration tests for logging system

use bridge_traits::logging::{ConsoleLogger, LogLevel};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, redact_stream_url, strip_path, LogFormat, LoggingConfig,
};
use std::sync::Arc;

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_pii);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());
    assert!(config.display_target);
}

#[test]
fn test_init_logging_once() {
    // Only one global subscriber per process; the second call must fail.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(ConsoleLogger::default()));

    assert!(init_logging(config.clone()).is_ok());
    tracing::info!(target: "core_playback", source = "https://example.com/watch?v=1", "queued");

    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Failed to initialize logging"));
}

#[test]
fn test_invalid_filter_is_rejected() {
    let config = LoggingConfig::default().with_filter("core_playback=notalevel");
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Invalid log filter"));
}

#[test]
fn test_redaction_helpers() {
    assert_eq!(redact_if_sensitive("cookie", "session=1"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("source", "clip"), "clip");

    assert_eq!(
        redact_stream_url("https://rr1.example.net/videoplayback?expire=1&sig=xyz"),
        "https://rr1.example.net/videoplayback?[REDACTED]"
    );

    assert_eq!(strip_path("/home/user/Videos/talk.mp4"), "talk.mp4");
    assert_eq!(strip_path(""), "");
}
