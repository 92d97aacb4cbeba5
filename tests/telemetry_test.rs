//! Telemetry module tests.

use coalesce_core::scheduler::Completion;
use coalesce_core::telemetry::{
    init_metrics, record_batch_dispatched, record_cache_lookup, record_items_settled,
    record_loader_failure, record_queue_depth, record_submission, record_submission_refused,
    BatchSpan, LogConfig, LogError, LogFormat, SpanExt,
};
use std::path::PathBuf;
use tracing::Span;

// =============================================================================
// LogConfig Tests
// =============================================================================

#[test]
fn log_config_default_is_json() {
    let config = LogConfig::default();
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, "info");
    assert!(config.output_path.is_none());
}

#[test]
fn log_config_with_output_path() {
    let config = LogConfig {
        format: LogFormat::Json,
        level: "coalesce_core::scheduler=trace".to_string(),
        output_path: Some(PathBuf::from("/tmp/coalesce.log")),
    };
    assert_eq!(config.output_path, Some(PathBuf::from("/tmp/coalesce.log")));
}

#[test]
fn log_format_parses_names() {
    assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    assert_eq!(" text ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
}

#[test]
fn log_format_rejects_unknown() {
    let err = "xml".parse::<LogFormat>().unwrap_err();
    assert!(matches!(err, LogError::InvalidFormat(ref f) if f == "xml"));
    assert!(err.to_string().contains("Invalid log format"));
}

// =============================================================================
// LogError Tests
// =============================================================================

#[test]
fn log_error_display() {
    let error = LogError::InvalidFilter("bad filter".to_string());
    assert!(error.to_string().contains("Invalid log filter"));
    assert!(error.to_string().contains("bad filter"));

    let error = LogError::FileOpen("permission denied".to_string());
    assert!(error.to_string().contains("Failed to open log file"));

    assert!(LogError::AlreadyInitialized.to_string().contains("already initialized"));
}

// =============================================================================
// Span Tests
// =============================================================================

#[test]
fn span_ext_records_both_outcomes() {
    let span = Span::none();
    span.record_result(&Ok::<u32, &str>(3));
    span.record_result(&Err::<u32, &str>("loader timed out"));
}

#[test]
fn batch_span_enters_without_subscriber() {
    let span = BatchSpan::new("users_by_id", 1, 100);
    let _guard = span.enter();
    span.record("resolved", 98usize);
    span.record("retried", 2usize);
}

// =============================================================================
// Metrics Tests
// =============================================================================

// Without an installed recorder every call is a no-op.

#[test]
fn metrics_init_twice() {
    init_metrics();
    init_metrics();
}

#[test]
fn engine_metrics_without_recorder() {
    record_submission("groups", false);
    record_submission("groups", true);
    record_submission_refused("groups");
    record_queue_depth("groups", 12);
    record_batch_dispatched("groups", 50);
    record_loader_failure("groups");
}

#[test]
fn settled_counts_skip_zero_tallies() {
    let completion = Completion { resolved: 3, retried: 1, ..Completion::default() };
    record_items_settled("thumbnails", &completion);
    record_items_settled("thumbnails", &Completion::default());
}

#[test]
fn cache_lookup_metrics() {
    record_cache_lookup("catalog_assets", true);
    record_cache_lookup("catalog_assets", false);
}
