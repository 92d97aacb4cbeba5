//! Dispatch queue: FIFO of requests awaiting a batch.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use super::error::BatchError;
use super::pending::RequestId;

/// Ordered holding area for undispatched requests.
///
/// `due_at` is when the current dispatch cycle becomes ready even if the
/// batch is under-sized. It is set by the first push into an empty cycle
/// and cleared when the queue drains.
#[derive(Debug)]
pub struct DispatchQueue {
    items: VecDeque<RequestId>,
    max_size: Option<usize>,
    process_delay: Duration,
    due_at: Option<Instant>,
}

impl DispatchQueue {
    pub fn new(max_size: Option<usize>, process_delay: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            max_size,
            process_delay,
            due_at: None,
        }
    }

    /// Fail with `QueueFull` if a new request may not enter.
    pub fn check_capacity<R>(&self) -> Result<(), BatchError<R>> {
        match self.max_size {
            Some(max) if self.items.len() >= max => Err(BatchError::QueueFull {
                current: self.items.len(),
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Append a newly submitted request.
    pub fn push(&mut self, id: RequestId, now: Instant) {
        self.items.push_back(id);
        if self.due_at.is_none() {
            self.due_at = Some(now + self.process_delay);
        }
    }

    /// Append a retried request. Retries are due immediately.
    pub fn requeue(&mut self, id: RequestId, now: Instant) {
        self.items.push_back(id);
        self.due_at = Some(self.due_at.map_or(now, |due| due.min(now)));
    }

    /// True when a dispatch should start at `now`, ignoring spacing.
    pub fn is_ready(&self, now: Instant, batch_size: usize) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.len() >= batch_size || self.due_at.map_or(false, |due| due <= now)
    }

    /// Remove up to `batch_size` requests from the front.
    ///
    /// Anything left behind is backlog and becomes due immediately.
    pub fn take_front(&mut self, batch_size: usize, now: Instant) -> Vec<RequestId> {
        let count = batch_size.min(self.items.len());
        let taken: Vec<RequestId> = self.items.drain(..count).collect();
        self.due_at = if self.items.is_empty() { None } else { Some(now) };
        taken
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.due_at
    }

    pub fn drain_all(&mut self) -> Vec<RequestId> {
        self.due_at = None;
        self.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
