// Copyright 2024-2026 coalesce-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! `simulate`: drive a batch engine against an in-process synthetic loader.
//!
//! Every key is submitted twice so deduplication is visible in the report.
//! The loader drops some keys on their first dispatch and rejects others,
//! exercising the retry and rejection paths.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;

use crate::scheduler::{
    BatchConfig, BatchEngine, BatchError, BatchLoader, ConfigError, EngineStats, LoadOutcome,
    LoaderError, LoggingObserver, OutcomeOf,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOptions {
    pub keys: u64,
    pub batch_size: usize,
    pub retry_cooldown: Duration,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            keys: 1000,
            batch_size: 100,
            retry_cooldown: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub keys: u64,
    pub submissions: u64,
    pub batch_size: usize,
    pub loader_calls: u64,
    pub resolved: u64,
    pub rejected: u64,
    pub failed: u64,
    pub elapsed_ms: u64,
    pub engine: EngineStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SyntheticRejection(u64);

impl fmt::Display for SyntheticRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key {} is not loadable", self.0)
    }
}

/// Echoes `key * 2`. Keys with `k % 7 == 3` are omitted on their first
/// dispatch; keys with `k % 11 == 10` are rejected.
#[derive(Default)]
struct SyntheticLoader {
    seen: Mutex<HashSet<u64>>,
    calls: Mutex<u64>,
}

#[async_trait]
impl BatchLoader for SyntheticLoader {
    type Key = u64;
    type DedupKey = u64;
    type Value = u64;
    type Rejection = SyntheticRejection;

    fn dedup_key(&self, key: &u64) -> u64 {
        *key
    }

    async fn load(&self, keys: Vec<u64>) -> Result<Vec<OutcomeOf<Self>>, LoaderError> {
        *self.calls.lock() += 1;
        tokio::task::yield_now().await;

        let mut seen = self.seen.lock();
        let outcomes = keys
            .into_iter()
            .filter_map(|key| {
                let first = seen.insert(key);
                if key % 11 == 10 {
                    Some(LoadOutcome::rejected(key, SyntheticRejection(key)))
                } else if key % 7 == 3 && first {
                    None
                } else {
                    Some(LoadOutcome::resolved(key, key * 2))
                }
            })
            .collect();
        Ok(outcomes)
    }
}

/// Run the simulation to completion and report what happened.
pub async fn run_simulation(options: &SimulationOptions) -> Result<SimulationReport, ConfigError> {
    let config = BatchConfig {
        batch_size: options.batch_size,
        retry_cooldown: options.retry_cooldown,
        ..BatchConfig::default()
    };
    let engine = BatchEngine::new("simulate", SyntheticLoader::default(), config, Arc::new(LoggingObserver))?;

    let started = tokio::time::Instant::now();
    let submissions: Vec<_> = (0..options.keys)
        .flat_map(|key| [engine.submit(key), engine.submit(key)])
        .collect();
    let submitted = submissions.len() as u64;
    let results = join_all(submissions).await;
    let elapsed = started.elapsed();

    let mut report = SimulationReport {
        keys: options.keys,
        submissions: submitted,
        batch_size: options.batch_size,
        loader_calls: *engine.loader().calls.lock(),
        resolved: 0,
        rejected: 0,
        failed: 0,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        engine: engine.stats(),
    };
    for result in results {
        match result {
            Ok(_) => report.resolved += 1,
            Err(BatchError::Rejected(_)) => report.rejected += 1,
            Err(_) => report.failed += 1,
        }
    }

    engine.shutdown();
    Ok(report)
}

/// CLI entry point. Prints the report as JSON; returns the exit code.
pub async fn run_simulate(args: &[String]) -> i32 {
    let mut options = SimulationOptions::default();

    if let Some(raw) = super::flag_value(args, "--keys") {
        match raw.parse() {
            Ok(keys) => options.keys = keys,
            Err(_) => {
                eprintln!("Invalid --keys value: {}", raw);
                return 2;
            }
        }
    }
    if let Some(raw) = super::flag_value(args, "--batch-size") {
        match raw.parse() {
            Ok(size) => options.batch_size = size,
            Err(_) => {
                eprintln!("Invalid --batch-size value: {}", raw);
                return 2;
            }
        }
    }

    let report = match run_simulation(&options).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Invalid simulation settings: {}", e);
            return 2;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            if report.failed == 0 { 0 } else { 1 }
        }
        Err(e) => {
            eprintln!("Failed to serialize report: {}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulation_settles_every_submission() {
        let options = SimulationOptions { keys: 50, batch_size: 8, retry_cooldown: Duration::from_millis(1) };
        let report = run_simulation(&options).await.unwrap();

        assert_eq!(report.submissions, 100);
        // 10, 21, 32, 43 are rejected; each was submitted twice.
        assert_eq!(report.rejected, 8);
        assert_eq!(report.resolved, 92);
        assert_eq!(report.failed, 0);
        assert!(report.loader_calls >= 7);
        assert_eq!(report.engine.outstanding, 0);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let options = SimulationOptions { batch_size: 0, ..SimulationOptions::default() };
        assert_eq!(run_simulation(&options).await.unwrap_err(), ConfigError::ZeroBatchSize);
    }
}
