//! Telemetry for the batch engines and resource façades.
//!
//! Provides structured logging, dispatch spans, and metrics through the
//! `metrics` facade. No exporter is bundled.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    init_metrics, record_batch_dispatched, record_cache_lookup, record_items_settled,
    record_loader_failure, record_queue_depth, record_submission, record_submission_refused,
};
pub use spans::{BatchSpan, SpanExt};
