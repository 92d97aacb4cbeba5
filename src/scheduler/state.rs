//! Engine state: the single serialization point for queue, dedup index,
//! retry list, spacing deadline and in-flight flag.
//!
//! Everything here is synchronous and clock-injected. The async driver in
//! `engine.rs` holds the lock only long enough to call one method.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tokio::time::Instant;

use super::batch::Batch;
use super::config::BatchConfig;
use super::dedup::DedupIndex;
use super::error::BatchError;
use super::loader::{BatchLoader, LoadOutcome, OutcomeOf};
use super::pending::{PendingRequest, RequestId, ResponseTx, TransientCause};
use super::queue::DispatchQueue;
use super::retry::{RetryDecision, RetryManager};
use super::spacing::DispatchSpacing;

type RequestOf<L> = PendingRequest<
    <L as BatchLoader>::Key,
    <L as BatchLoader>::DedupKey,
    <L as BatchLoader>::Value,
    <L as BatchLoader>::Rejection,
>;

/// What the driver should do next.
#[derive(Debug)]
pub enum Step<K> {
    Dispatch(Batch<K>),
    /// Nothing is ready; re-evaluate at this instant or on the next wake.
    WaitUntil(Instant),
    /// Nothing is scheduled; re-evaluate on the next wake.
    Idle,
}

/// How a submission was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Attached to an outstanding request for the same dedup key.
    Attached,
    /// A new request entered the queue.
    Enqueued,
}

/// Raw result of a loader call as seen by the state.
pub enum DispatchResult<L: BatchLoader> {
    Loaded(Vec<OutcomeOf<L>>),
    Failed,
}

/// Per-dispatch tally, used for logging and metrics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Completion {
    pub resolved: usize,
    pub rejected: usize,
    pub retried: usize,
    pub exhausted: usize,
    /// Debug renderings of outcome keys that were never dispatched.
    pub unexpected: Vec<String>,
}

/// Point-in-time view of an engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub queued: usize,
    pub outstanding: usize,
    pub retry_waiting: usize,
    pub dispatches: u64,
    pub in_flight: bool,
}

enum Settle<V, R> {
    Resolve(V),
    Reject(R),
    Transient(TransientCause),
}

pub struct EngineState<L: BatchLoader> {
    requests: HashMap<RequestId, RequestOf<L>>,
    dedup: DedupIndex<L::DedupKey>,
    queue: DispatchQueue,
    retry: RetryManager,
    spacing: DispatchSpacing,
    batch_size: usize,
    in_flight: bool,
    stopped: bool,
    next_id: u64,
    dispatches: u64,
}

impl<L: BatchLoader> EngineState<L> {
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            requests: HashMap::new(),
            dedup: DedupIndex::new(config.deduplicate_items),
            queue: DispatchQueue::new(config.max_queue_size, config.process_delay),
            retry: RetryManager::new(config.max_attempts, config.retry_cooldown),
            spacing: DispatchSpacing::new(config.min_process_delay),
            batch_size: config.batch_size,
            in_flight: false,
            stopped: false,
            next_id: 1,
            dispatches: 0,
        }
    }

    /// Attach to an outstanding request or enqueue a new one.
    pub fn submit(
        &mut self,
        key: L::Key,
        dedup_key: L::DedupKey,
        waiter: ResponseTx<L::Value, L::Rejection>,
        now: Instant,
    ) -> Result<SubmitOutcome, BatchError<L::Rejection>> {
        if self.stopped {
            return Err(BatchError::EngineStopped);
        }

        if let Some(id) = self.dedup.lookup(&dedup_key) {
            if let Some(request) = self.requests.get_mut(&id) {
                request.attach(waiter);
                return Ok(SubmitOutcome::Attached);
            }
        }

        self.queue.check_capacity()?;

        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.dedup.register(dedup_key.clone(), id);
        self.requests.insert(id, PendingRequest::new(id, key, dedup_key, waiter));
        self.queue.push(id, now);
        Ok(SubmitOutcome::Enqueued)
    }

    /// Decide the next driver action at `now`.
    ///
    /// Moves cooled-down retries into the queue first. A ready batch that is
    /// held back by spacing stays in the queue until the spacing deadline.
    pub fn next_step(&mut self, now: Instant) -> Step<L::Key> {
        if self.stopped {
            return Step::Idle;
        }

        for id in self.retry.drain_due(now) {
            if self.requests.contains_key(&id) {
                self.queue.requeue(id, now);
            }
        }

        if self.in_flight {
            return Step::Idle;
        }

        let wake = if self.queue.is_ready(now, self.batch_size) {
            match self.spacing.blocked_until(now) {
                Some(deadline) => Some(deadline),
                None => return Step::Dispatch(self.start_dispatch(now)),
            }
        } else {
            self.queue.due_at()
        };

        match earliest(wake, self.retry.next_due()) {
            Some(at) => Step::WaitUntil(at),
            None => Step::Idle,
        }
    }

    fn start_dispatch(&mut self, now: Instant) -> Batch<L::Key> {
        let taken = self.queue.take_front(self.batch_size, now);
        self.spacing.record_start(now);
        self.in_flight = true;
        self.dispatches += 1;

        let mut ids = Vec::with_capacity(taken.len());
        let mut keys = Vec::with_capacity(taken.len());
        for id in taken {
            if let Some(request) = self.requests.get_mut(&id) {
                request.record_dispatch();
                keys.push(request.key.clone());
                ids.push(id);
            }
        }

        Batch { number: self.dispatches, ids, keys }
    }

    /// Fan a dispatch result out to the affected requests.
    pub fn complete(
        &mut self,
        loader: &L,
        ids: Vec<RequestId>,
        result: DispatchResult<L>,
        now: Instant,
    ) -> Completion {
        self.in_flight = false;
        let mut completion = Completion::default();

        let outcomes = match result {
            DispatchResult::Loaded(outcomes) => outcomes,
            DispatchResult::Failed => {
                for id in ids {
                    self.settle_transient(id, TransientCause::LoaderFailed, now, &mut completion);
                }
                return completion;
            }
        };

        let dispatched: HashSet<L::DedupKey> = ids
            .iter()
            .filter_map(|id| self.requests.get(id))
            .map(|request| request.dedup_key.clone())
            .collect();

        let mut by_key: HashMap<L::DedupKey, OutcomeOf<L>> = HashMap::with_capacity(outcomes.len());
        for outcome in outcomes {
            let dedup_key = loader.dedup_key(outcome.key());
            if dispatched.contains(&dedup_key) {
                by_key.insert(dedup_key, outcome);
            } else {
                completion.unexpected.push(format!("{:?}", outcome.key()));
            }
        }

        for id in ids {
            let Some(request) = self.requests.get(&id) else { continue };
            let settle = match by_key.get(&request.dedup_key) {
                Some(LoadOutcome::Resolved { value, .. }) => Settle::Resolve(value.clone()),
                Some(LoadOutcome::Rejected { rejection, .. }) => Settle::Reject(rejection.clone()),
                Some(LoadOutcome::Pending { .. }) => Settle::Transient(TransientCause::Pending),
                None => Settle::Transient(TransientCause::Dropped),
            };

            match settle {
                Settle::Resolve(value) => {
                    if let Some(request) = self.finish(id) {
                        request.resolve(value);
                    }
                    completion.resolved += 1;
                }
                Settle::Reject(rejection) => {
                    if let Some(request) = self.finish(id) {
                        request.fail(BatchError::Rejected(rejection));
                    }
                    completion.rejected += 1;
                }
                Settle::Transient(cause) => {
                    self.settle_transient(id, cause, now, &mut completion);
                }
            }
        }

        completion
    }

    fn settle_transient(
        &mut self,
        id: RequestId,
        cause: TransientCause,
        now: Instant,
        completion: &mut Completion,
    ) {
        let Some(request) = self.requests.get_mut(&id) else { return };
        request.record_transient(cause);

        match self.retry.decide(request.attempts()) {
            RetryDecision::Retry => {
                self.retry.schedule(id, now);
                completion.retried += 1;
            }
            RetryDecision::Exhausted => {
                let error = request.exhausted_error();
                if let Some(request) = self.finish(id) {
                    request.fail(error);
                }
                completion.exhausted += 1;
            }
        }
    }

    /// Remove a request from the table and the dedup index together.
    fn finish(&mut self, id: RequestId) -> Option<RequestOf<L>> {
        let request = self.requests.remove(&id)?;
        self.dedup.release(&request.dedup_key, id);
        Some(request)
    }

    /// Stop accepting work and fail everything outstanding with
    /// `EngineStopped`. Returns the number of requests failed.
    pub fn shutdown(&mut self) -> usize {
        self.stopped = true;
        self.queue.drain_all();
        self.retry.drain_all();
        self.dedup.clear();

        let count = self.requests.len();
        for (_, request) in self.requests.drain() {
            request.fail(BatchError::EngineStopped);
        }
        count
    }

    #[cfg(test)]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            queued: self.queue.len(),
            outstanding: self.requests.len(),
            retry_waiting: self.retry.len(),
            dispatches: self.dispatches,
            in_flight: self.in_flight,
        }
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
