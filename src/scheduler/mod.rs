//! Batch scheduling engine.
//!
//! Coalesces individually submitted keys into bounded batches, dispatches
//! each batch to a caller-supplied loader, fans results back out to every
//! submitter of a key, and retries unresolved items under a bounded policy.
//! Dispatch starts are spaced by a configurable minimum delay, and at most
//! one load per dedup key is ever outstanding.

mod batch;
mod config;
mod dedup;
mod engine;
mod error;
mod loader;
mod observer;
mod pending;
mod queue;
mod retry;
mod spacing;
mod state;
mod submission;

pub use config::{BatchConfig, ConfigError};
pub use engine::BatchEngine;
pub use error::BatchError;
pub use loader::{BatchLoader, LoadOutcome, LoaderError, OutcomeOf};
pub use observer::{EngineFault, ErrorObserver, LoggingObserver, NoopObserver};
pub use state::{Completion, EngineStats};
pub use submission::Submission;
