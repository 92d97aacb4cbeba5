//! Per-item error types delivered to submitters.
//!
//! Errors reach only the waiters of the affected item. Systemic loader
//! failures are reported separately through the engine's error observer.

use thiserror::Error;

/// Terminal outcome of a submission that did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError<R> {
    /// The loader examined the item and refused it. Never retried.
    #[error("item rejected by loader: {0}")]
    Rejected(R),

    #[error("item unresolved after {attempts} attempts")]
    MaxAttemptsExceeded { attempts: u32 },

    /// Retries ran out while the downstream still reported the item as pending.
    #[error("item still pending downstream after {attempts} attempts")]
    StillPending { attempts: u32 },

    #[error("dispatch queue full: {current}/{max} pending items")]
    QueueFull { current: usize, max: usize },

    #[error("batch engine stopped")]
    EngineStopped,
}

impl<R> BatchError<R> {
    /// Returns true if this error is submission-time backpressure.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }

    /// Returns true if the item exhausted its retry budget.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::MaxAttemptsExceeded { .. } | Self::StillPending { .. })
    }

    /// Convert the rejection payload, keeping every other variant.
    pub fn map_rejection<T>(self, f: impl FnOnce(R) -> T) -> BatchError<T> {
        match self {
            Self::Rejected(r) => BatchError::Rejected(f(r)),
            Self::MaxAttemptsExceeded { attempts } => BatchError::MaxAttemptsExceeded { attempts },
            Self::StillPending { attempts } => BatchError::StillPending { attempts },
            Self::QueueFull { current, max } => BatchError::QueueFull { current, max },
            Self::EngineStopped => BatchError::EngineStopped,
        }
    }
}
