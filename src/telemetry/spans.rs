//! Span utilities for batch dispatches.

use tracing::{debug_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for the span wrapping one loader call.
pub struct BatchSpan;

impl BatchSpan {
    /// Fields:
    /// - `engine`, `batch`, `size`: set on creation
    /// - `status`, `error.message`: set by `SpanExt::record_result`
    /// - `resolved`, `retried`: set after fan-out
    pub fn new(engine: &str, batch: u64, size: usize) -> Span {
        debug_span!(
            "batch_dispatch",
            engine = %engine,
            batch,
            size,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            resolved = tracing::field::Empty,
            retried = tracing::field::Empty,
        )
    }
}
