//! Loader invocation protocol.
//!
//! A `BatchLoader` receives the ordered keys of one batch and returns one
//! outcome per key it could settle. Outcomes may come back in any order and
//! may omit keys; matching is by dedup key, never by position. Omitted keys
//! are treated as transient and retried. The engine applies no timeout, so
//! loaders must bound their own latency (usually through the transport).

use std::fmt;
use std::hash::Hash;

use async_trait::async_trait;
use thiserror::Error;

/// Per-item result of a batch load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<K, V, R> {
    /// Resolve every waiter with `value`.
    Resolved { key: K, value: V },
    /// Reject every waiter with `rejection`. Terminal.
    Rejected { key: K, rejection: R },
    /// Downstream is still preparing the item. Retried like a dropped key.
    Pending { key: K },
}

impl<K, V, R> LoadOutcome<K, V, R> {
    pub fn resolved(key: K, value: V) -> Self {
        Self::Resolved { key, value }
    }

    pub fn rejected(key: K, rejection: R) -> Self {
        Self::Rejected { key, rejection }
    }

    pub fn pending(key: K) -> Self {
        Self::Pending { key }
    }

    /// Key this outcome answers for.
    pub fn key(&self) -> &K {
        match self {
            Self::Resolved { key, .. } | Self::Rejected { key, .. } | Self::Pending { key } => key,
        }
    }
}

/// Outcome type produced by loader `L`.
pub type OutcomeOf<L> = LoadOutcome<
    <L as BatchLoader>::Key,
    <L as BatchLoader>::Value,
    <L as BatchLoader>::Rejection,
>;

/// Systemic failure of a whole batch load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("loader task aborted: {0}")]
    Aborted(String),
}

/// Caller-supplied batch function driven by a `BatchEngine`.
#[async_trait]
pub trait BatchLoader: Send + Sync + 'static {
    /// Item identity sent to `load`.
    type Key: Clone + fmt::Debug + Send + Sync + 'static;
    /// Identity used for deduplication and result matching.
    type DedupKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    type Value: Clone + Send + 'static;
    type Rejection: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Derive the dedup key for `key`.
    fn dedup_key(&self, key: &Self::Key) -> Self::DedupKey;

    /// Load one batch. `keys` holds at most `batch_size` items.
    async fn load(&self, keys: Vec<Self::Key>) -> Result<Vec<OutcomeOf<Self>>, LoaderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_key_accessor() {
        let o: LoadOutcome<&str, u32, String> = LoadOutcome::resolved("a", 1);
        assert_eq!(*o.key(), "a");
        let o: LoadOutcome<&str, u32, String> = LoadOutcome::rejected("b", "no".into());
        assert_eq!(*o.key(), "b");
        let o: LoadOutcome<&str, u32, String> = LoadOutcome::pending("c");
        assert_eq!(*o.key(), "c");
    }

    #[test]
    fn loader_error_display() {
        let e = LoaderError::Status { status: 429, message: "Too many requests".into() };
        assert_eq!(e.to_string(), "unexpected status 429: Too many requests");
    }
}
