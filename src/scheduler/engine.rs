//! Batch engine: submission front-end and the scheduler driver task.
//!
//! One driver task per engine owns all timing. Submissions take the state
//! lock briefly and wake the driver; the loader runs with the lock released
//! so new submissions keep flowing while a batch is in flight.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::batch::Batch;
use super::config::{BatchConfig, ConfigError};
use super::error::BatchError;
use super::loader::{BatchLoader, LoaderError};
use super::observer::{self, EngineFault, ErrorObserver};
use super::state::{DispatchResult, EngineState, EngineStats, Step, SubmitOutcome};
use super::submission::Submission;
use crate::telemetry::{self, BatchSpan, SpanExt};

/// Coalesces submitted keys into batches for one loader.
///
/// Cloning is cheap and shares the engine. The driver stops when the last
/// clone is dropped or `shutdown` is called; outstanding submissions then
/// fail with `EngineStopped`.
pub struct BatchEngine<L: BatchLoader> {
    handle: Arc<EngineHandle<L>>,
}

impl<L: BatchLoader> Clone for BatchEngine<L> {
    fn clone(&self) -> Self {
        Self { handle: Arc::clone(&self.handle) }
    }
}

struct EngineHandle<L: BatchLoader> {
    shared: Arc<Shared<L>>,
    shutdown: CancellationToken,
}

impl<L: BatchLoader> Drop for EngineHandle<L> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Shared<L: BatchLoader> {
    name: String,
    loader: Arc<L>,
    state: Mutex<EngineState<L>>,
    wake: Notify,
    observer: Arc<dyn ErrorObserver>,
}

impl<L: BatchLoader> BatchEngine<L> {
    /// Build an engine and spawn its driver on the current tokio runtime.
    pub fn new(
        name: impl Into<String>,
        loader: L,
        config: BatchConfig,
        observer: Arc<dyn ErrorObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let name = name.into();
        tracing::debug!(
            engine = %name,
            batch_size = config.batch_size,
            process_delay_ms = config.process_delay.as_millis() as u64,
            min_process_delay_ms = config.min_process_delay.as_millis() as u64,
            max_attempts = config.max_attempts,
            "starting batch engine"
        );

        let shared = Arc::new(Shared {
            name,
            loader: Arc::new(loader),
            state: Mutex::new(EngineState::new(&config)),
            wake: Notify::new(),
            observer,
        });
        let shutdown = CancellationToken::new();
        runtime.spawn(drive(Arc::clone(&shared), shutdown.clone()));

        Ok(Self { handle: Arc::new(EngineHandle { shared, shutdown }) })
    }

    /// Request `key`. Identical dedup keys share one outstanding load.
    pub fn submit(&self, key: L::Key) -> Submission<L::Value, L::Rejection> {
        let shared = &self.handle.shared;
        if self.handle.shutdown.is_cancelled() {
            return Submission::failed(BatchError::EngineStopped);
        }

        let dedup_key = shared.loader.dedup_key(&key);
        let (tx, rx) = oneshot::channel();
        let admitted = {
            let mut state = shared.state.lock();
            state
                .submit(key, dedup_key, tx, Instant::now())
                .map(|outcome| (outcome, state.stats().queued))
        };

        match admitted {
            Ok((SubmitOutcome::Enqueued, queued)) => {
                telemetry::record_submission(&shared.name, false);
                telemetry::record_queue_depth(&shared.name, queued);
                shared.wake.notify_one();
                Submission::waiting(rx)
            }
            Ok((SubmitOutcome::Attached, _)) => {
                telemetry::record_submission(&shared.name, true);
                Submission::waiting(rx)
            }
            Err(error) => {
                if error.is_warning() {
                    tracing::warn!(engine = %shared.name, error = %error, "submission refused");
                }
                telemetry::record_submission_refused(&shared.name);
                Submission::failed(error)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.handle.shared.name
    }

    pub fn loader(&self) -> &L {
        &self.handle.shared.loader
    }

    pub fn stats(&self) -> EngineStats {
        self.handle.shared.state.lock().stats()
    }

    /// Stop the driver. An in-flight batch still completes.
    pub fn shutdown(&self) {
        self.handle.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.shutdown.is_cancelled()
    }
}

async fn drive<L: BatchLoader>(shared: Arc<Shared<L>>, shutdown: CancellationToken) {
    while !shutdown.is_cancelled() {
        let step = shared.state.lock().next_step(Instant::now());
        match step {
            Step::Dispatch(batch) => shared.dispatch(batch).await,
            Step::WaitUntil(deadline) => {
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    () = shared.wake.notified() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            Step::Idle => {
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    () = shared.wake.notified() => {}
                }
            }
        }
    }

    let failed = shared.state.lock().shutdown();
    tracing::debug!(engine = %shared.name, failed, "batch engine stopped");
}

impl<L: BatchLoader> Shared<L> {
    async fn dispatch(&self, batch: Batch<L::Key>) {
        let span = BatchSpan::new(&self.name, batch.number, batch.len());
        telemetry::record_batch_dispatched(&self.name, batch.len());
        tracing::debug!(parent: &span, "dispatching batch");

        let (ids, keys) = batch.into_parts();
        let batch_size = ids.len();
        let loader = Arc::clone(&self.loader);
        let joined = tokio::spawn(async move { loader.load(keys).await }.instrument(span.clone())).await;

        // A panicking loader counts as a failed load call.
        let result = match joined {
            Ok(result) => result,
            Err(join_error) => Err(LoaderError::Aborted(join_error.to_string())),
        };
        span.record_result(&result);

        let dispatch_result = match result {
            Ok(outcomes) => DispatchResult::Loaded(outcomes),
            Err(error) => {
                tracing::warn!(parent: &span, error = %error, "batch load failed");
                telemetry::record_loader_failure(&self.name);
                let fault = EngineFault::LoaderFailed {
                    engine: self.name.clone(),
                    batch_size,
                    error,
                };
                observer::notify(self.observer.as_ref(), &fault);
                DispatchResult::Failed
            }
        };

        let (completion, stats) = {
            let mut state = self.state.lock();
            let completion = state.complete(&self.loader, ids, dispatch_result, Instant::now());
            (completion, state.stats())
        };

        for key in &completion.unexpected {
            tracing::warn!(parent: &span, key = %key, "loader returned outcome for undispatched key");
            let fault = EngineFault::UnexpectedOutcome { engine: self.name.clone(), key: key.clone() };
            observer::notify(self.observer.as_ref(), &fault);
        }

        span.record("resolved", completion.resolved);
        span.record("retried", completion.retried);
        telemetry::record_items_settled(&self.name, &completion);
        telemetry::record_queue_depth(&self.name, stats.queued);
    }
}
