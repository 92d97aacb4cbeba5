//! Error observer for systemic engine faults.
//!
//! The observer is invoked best-effort. A panicking observer is logged and
//! swallowed so it can never unwind into the scheduler.

use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;

use super::loader::LoaderError;

/// Fault reported to an engine's observer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineFault {
    /// A whole batch load failed. Reported once per batch.
    #[error("engine {engine}: batch of {batch_size} failed: {error}")]
    LoaderFailed {
        engine: String,
        batch_size: usize,
        error: LoaderError,
    },

    /// The loader returned an outcome for a key it was not given.
    #[error("engine {engine}: loader returned outcome for undispatched key {key}")]
    UnexpectedOutcome { engine: String, key: String },
}

/// Sink for engine faults.
pub trait ErrorObserver: Send + Sync {
    fn observe(&self, fault: &EngineFault);
}

impl<F> ErrorObserver for F
where
    F: Fn(&EngineFault) + Send + Sync,
{
    fn observe(&self, fault: &EngineFault) {
        self(fault)
    }
}

/// Observer that discards every fault.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ErrorObserver for NoopObserver {
    fn observe(&self, _fault: &EngineFault) {}
}

/// Observer that logs faults through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ErrorObserver for LoggingObserver {
    fn observe(&self, fault: &EngineFault) {
        tracing::error!(fault = %fault, "batch engine fault");
    }
}

/// Deliver `fault` to `observer` inside a panic boundary.
pub(crate) fn notify(observer: &dyn ErrorObserver, fault: &EngineFault) {
    let delivered = catch_unwind(AssertUnwindSafe(|| observer.observe(fault)));
    if delivered.is_err() {
        tracing::error!(fault = %fault, "error observer panicked while handling fault");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fault() -> EngineFault {
        EngineFault::LoaderFailed {
            engine: "test".into(),
            batch_size: 3,
            error: LoaderError::Transport("reset".into()),
        }
    }

    #[test]
    fn closure_observer_receives_fault() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let observer = move |_: &EngineFault| {
            counter.fetch_add(1, Ordering::SeqCst);
        };
        notify(&observer, &fault());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_observer_is_contained() {
        let observer = |_: &EngineFault| panic!("observer blew up");
        notify(&observer, &fault());
    }

    #[test]
    fn fault_display_names_engine() {
        assert!(fault().to_string().starts_with("engine test:"));
    }
}
