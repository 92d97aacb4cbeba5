//! coalesce-core
//!
//! Request coalescing and batch scheduling for chatty downstream APIs.
//!
//! Callers ask for one item at a time; a `BatchEngine` groups the keys into
//! bounded batches, sends each batch through a caller-supplied
//! `BatchLoader`, and hands every caller the result for its key.
//!
//! # Guarantees
//!
//! - At most one outstanding load per dedup key; late callers attach
//! - Batches never exceed `batch_size`; dispatch starts are spaced by at
//!   least `min_process_delay`, and only one dispatch is in flight
//! - Items the loader omits are retried after `retry_cooldown`, up to
//!   `max_attempts` dispatches; explicit rejections are final
//! - Every submission completes exactly once
//!
//! The `clients` module builds typed façades (catalog, users, groups,
//! thumbnails) on top of the engine with TTL result caches in front.

pub mod assets;
pub mod cache;
pub mod cli;
pub mod clients;
pub mod config;
pub mod scheduler;
pub mod telemetry;

pub use cache::TtlCache;
pub use scheduler::{
    BatchConfig, BatchEngine, BatchError, BatchLoader, ConfigError, EngineFault, EngineStats,
    ErrorObserver, LoadOutcome, LoaderError, OutcomeOf, Submission,
};
