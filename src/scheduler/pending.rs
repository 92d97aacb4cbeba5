//! Outstanding request type tracked by the engine.

use tokio::sync::oneshot;

use super::error::BatchError;

/// Channel delivering an item's outcome back to one submitter.
pub type ResponseTx<V, R> = oneshot::Sender<Result<V, BatchError<R>>>;
/// Receiver half awaited by a submitter.
pub type ResponseRx<V, R> = oneshot::Receiver<Result<V, BatchError<R>>>;

/// Engine-local identity of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Why an item was left unresolved by its last dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientCause {
    /// The loader omitted the key.
    Dropped,
    /// The loader reported the key as still pending downstream.
    Pending,
    /// The whole load call failed.
    LoaderFailed,
}

/// One logical key awaiting a result, with every attached waiter.
pub struct PendingRequest<K, D, V, R> {
    pub id: RequestId,
    pub key: K,
    pub dedup_key: D,
    attempts: u32,
    waiters: Vec<ResponseTx<V, R>>,
    last_transient: Option<TransientCause>,
}

impl<K, D, V, R> std::fmt::Debug for PendingRequest<K, D, V, R>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("attempts", &self.attempts)
            .field("waiters", &self.waiters.len())
            .finish()
    }
}

impl<K, D, V, R> PendingRequest<K, D, V, R>
where
    V: Clone,
    R: Clone,
{
    pub fn new(id: RequestId, key: K, dedup_key: D, waiter: ResponseTx<V, R>) -> Self {
        Self {
            id,
            key,
            dedup_key,
            attempts: 0,
            waiters: vec![waiter],
            last_transient: None,
        }
    }

    /// Attach another submitter to this request.
    pub fn attach(&mut self, waiter: ResponseTx<V, R>) {
        self.waiters.push(waiter);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[cfg(test)]
    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    /// Count one dispatch into a batch.
    pub fn record_dispatch(&mut self) {
        self.attempts += 1;
    }

    pub fn record_transient(&mut self, cause: TransientCause) {
        self.last_transient = Some(cause);
    }

    /// Terminal error once retries are exhausted.
    pub fn exhausted_error(&self) -> BatchError<R> {
        match self.last_transient {
            Some(TransientCause::Pending) => BatchError::StillPending { attempts: self.attempts },
            _ => BatchError::MaxAttemptsExceeded { attempts: self.attempts },
        }
    }

    /// Resolve every waiter with `value`. A dropped receiver does not
    /// affect delivery to the others.
    pub fn resolve(self, value: V) {
        for tx in self.waiters {
            let _ = tx.send(Ok(value.clone()));
        }
    }

    /// Reject every waiter with `error`.
    pub fn fail(self, error: BatchError<R>) {
        for tx in self.waiters {
            let _ = tx.send(Err(error.clone()));
        }
    }
}
