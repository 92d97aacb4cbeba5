//! Metrics emitted through the `metrics` facade.
//!
//! Nothing is exported unless the embedding process installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

use crate::scheduler::Completion;

/// Register metric descriptions. Safe to call more than once.
pub fn init_metrics() {
    describe_counter!("coalesce_submissions_total", "Keys submitted to an engine, by admission");
    describe_counter!("coalesce_submissions_refused_total", "Submissions refused at admission");
    describe_gauge!("coalesce_queue_depth", "Requests waiting in the dispatch queue");
    describe_counter!("coalesce_batches_total", "Loader calls started");
    describe_histogram!("coalesce_batch_size", "Keys per loader call");
    describe_counter!("coalesce_loader_failures_total", "Loader calls that failed as a whole");
    describe_counter!("coalesce_items_settled_total", "Requests settled after a dispatch, by outcome");
    describe_counter!("coalesce_cache_lookups_total", "Result cache lookups, by hit or miss");
}

/// `attached` is true when the key joined an outstanding request.
pub fn record_submission(engine: &str, attached: bool) {
    let admission = if attached { "attached" } else { "enqueued" };
    counter!(
        "coalesce_submissions_total",
        "engine" => engine.to_string(),
        "admission" => admission
    )
    .increment(1);
}

pub fn record_submission_refused(engine: &str) {
    counter!("coalesce_submissions_refused_total", "engine" => engine.to_string()).increment(1);
}

pub fn record_queue_depth(engine: &str, depth: usize) {
    gauge!("coalesce_queue_depth", "engine" => engine.to_string()).set(depth as f64);
}

pub fn record_batch_dispatched(engine: &str, size: usize) {
    counter!("coalesce_batches_total", "engine" => engine.to_string()).increment(1);
    histogram!("coalesce_batch_size", "engine" => engine.to_string()).record(size as f64);
}

pub fn record_loader_failure(engine: &str) {
    counter!("coalesce_loader_failures_total", "engine" => engine.to_string()).increment(1);
}

/// Record one dispatch's fan-out tally.
pub fn record_items_settled(engine: &str, completion: &Completion) {
    let tallies = [
        ("resolved", completion.resolved),
        ("rejected", completion.rejected),
        ("retried", completion.retried),
        ("exhausted", completion.exhausted),
    ];
    for (outcome, count) in tallies {
        if count > 0 {
            counter!(
                "coalesce_items_settled_total",
                "engine" => engine.to_string(),
                "outcome" => outcome
            )
            .increment(count as u64);
        }
    }
}

pub fn record_cache_lookup(cache: &str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!(
        "coalesce_cache_lookups_total",
        "cache" => cache.to_string(),
        "result" => result
    )
    .increment(1);
}
