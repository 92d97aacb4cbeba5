//! Client-side rate limiting between dispatch starts.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces `min_gap` between the start of one dispatch and the next.
///
/// The deadline advances when a dispatch starts, not when it completes.
#[derive(Debug)]
pub struct DispatchSpacing {
    min_gap: Duration,
    next_allowed: Option<Instant>,
}

impl DispatchSpacing {
    pub fn new(min_gap: Duration) -> Self {
        Self { min_gap, next_allowed: None }
    }

    /// Deadline to defer to, if a dispatch may not start at `now`.
    pub fn blocked_until(&self, now: Instant) -> Option<Instant> {
        self.next_allowed.filter(|deadline| now < *deadline)
    }

    pub fn record_start(&mut self, now: Instant) {
        if !self.min_gap.is_zero() {
            self.next_allowed = Some(now + self.min_gap);
        }
    }
}
