//! Engine configuration.

use std::time::Duration;

use thiserror::Error;

/// Configuration for a single batch engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum items per dispatch.
    pub batch_size: usize,
    /// Wait before dispatching an under-sized batch. Zero dispatches immediately.
    pub process_delay: Duration,
    /// Minimum spacing between the starts of two dispatches.
    pub min_process_delay: Duration,
    /// Dispatch attempts allowed per item before it fails terminally.
    pub max_attempts: u32,
    /// Cooldown before an unresolved item re-enters the queue.
    pub retry_cooldown: Duration,
    /// Queue bound. `None` is unbounded.
    pub max_queue_size: Option<usize>,
    /// Attach identical keys to one outstanding request.
    pub deduplicate_items: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            process_delay: Duration::ZERO,
            min_process_delay: Duration::ZERO,
            max_attempts: 5,
            retry_cooldown: Duration::from_millis(500),
            max_queue_size: None,
            deduplicate_items: true,
        }
    }
}

impl BatchConfig {
    /// Reject settings the scheduler cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        if self.max_queue_size == Some(0) {
            return Err(ConfigError::ZeroQueueSize);
        }
        Ok(())
    }
}

/// Errors raised while building an engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("max_attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("max_queue_size must be at least 1 when set")]
    ZeroQueueSize,

    #[error("no tokio runtime available to drive the scheduler")]
    NoRuntime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let cfg = BatchConfig { batch_size: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBatchSize));

        let cfg = BatchConfig { max_attempts: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroMaxAttempts));

        let cfg = BatchConfig { max_queue_size: Some(0), ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroQueueSize));
    }
}
