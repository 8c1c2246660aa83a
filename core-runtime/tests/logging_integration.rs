//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_url_query, LogFormat, LoggingConfig,
};
use core_runtime::Error;

#[test]
fn test_init_logging_installs_once() {
    let config = || {
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Warn)
    };

    // The global subscriber can be installed once per process.
    init_logging(config()).unwrap();
    assert!(matches!(init_logging(config()), Err(Error::Logging(_))));
}

#[test]
fn test_invalid_log_format_name() {
    let err = "yaml".parse::<LogFormat>().unwrap_err();
    assert!(err.to_string().contains("yaml"));
    assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
}

#[test]
fn test_redaction_of_stream_credentials() {
    assert_eq!(redact_if_sensitive("token", "abc123"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("Authorization", "Bearer x"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("channel", "News One"), "News One");
    assert_eq!(redact_if_sensitive("generation", "4"), "4");
}

#[test]
fn test_url_query_stripping() {
    assert_eq!(
        strip_url_query("http://line.example.tv/live/1.m3u8?username=bob&password=pw"),
        "http://line.example.tv/live/1.m3u8"
    );
    assert_eq!(
        strip_url_query("https://cdn.example.com/a.m3u8#t=10"),
        "https://cdn.example.com/a.m3u8"
    );
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_directives("core_playback=trace,core_playlist=debug")
        .with_span_events(true)
        .verbose();

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(
        config.directives.as_deref(),
        Some("core_playback=trace,core_playlist=debug")
    );
    assert!(config.span_events);
    assert!(config.verbose_metadata);
    assert!(config.host_sink.is_none());
}
