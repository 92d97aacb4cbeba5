//! Retry manager: bounded re-entry of unresolved items after a cooldown.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use super::pending::RequestId;

/// What to do with an item left unresolved by a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-enter the queue after the cooldown.
    Retry,
    /// Fail terminally.
    Exhausted,
}

/// Holds items cooling down before they re-enter the queue.
///
/// The cooldown is constant, so due times are non-decreasing in
/// insertion order and a FIFO is enough.
#[derive(Debug)]
pub struct RetryManager {
    max_attempts: u32,
    cooldown: Duration,
    waiting: VecDeque<(Instant, RequestId)>,
}

impl RetryManager {
    pub fn new(max_attempts: u32, cooldown: Duration) -> Self {
        Self { max_attempts, cooldown, waiting: VecDeque::new() }
    }

    pub fn decide(&self, attempts: u32) -> RetryDecision {
        if attempts < self.max_attempts {
            RetryDecision::Retry
        } else {
            RetryDecision::Exhausted
        }
    }

    pub fn schedule(&mut self, id: RequestId, now: Instant) {
        self.waiting.push_back((now + self.cooldown, id));
    }

    /// Earliest cooldown deadline.
    pub fn next_due(&self) -> Option<Instant> {
        self.waiting.front().map(|(due, _)| *due)
    }

    /// Pop every item whose cooldown has elapsed, in schedule order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<RequestId> {
        let mut due = Vec::new();
        while let Some((at, id)) = self.waiting.front().copied() {
            if at > now {
                break;
            }
            self.waiting.pop_front();
            due.push(id);
        }
        due
    }

    pub fn drain_all(&mut self) -> Vec<RequestId> {
        self.waiting.drain(..).map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }
}
