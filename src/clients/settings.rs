//! Per-façade engine and cache settings.

use std::time::Duration;

use crate::scheduler::BatchConfig;

/// Settings shared by every resource façade. Use the preset matching the
/// client and override fields as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub process_delay: Duration,
    pub min_process_delay: Duration,
    pub batch_size: usize,
    /// Result cache lifetime. Zero disables caching.
    pub cache_ttl: Duration,
    pub retry_cooldown: Duration,
    pub max_attempts: u32,
    pub max_queue_size: Option<usize>,
}

impl ClientSettings {
    /// The catalog endpoints are heavily throttled, so dispatches are spaced
    /// far apart to fill batches.
    pub fn catalog() -> Self {
        Self {
            min_process_delay: Duration::from_secs(10),
            ..Self::base()
        }
    }

    pub fn users() -> Self {
        Self::base()
    }

    pub fn groups() -> Self {
        Self {
            batch_size: 50,
            cache_ttl: Duration::from_secs(5 * 60),
            ..Self::base()
        }
    }

    pub fn thumbnails() -> Self {
        Self::base()
    }

    fn base() -> Self {
        let defaults = BatchConfig::default();
        Self {
            process_delay: Duration::from_millis(100),
            min_process_delay: Duration::from_millis(500),
            batch_size: 100,
            cache_ttl: Duration::from_secs(60),
            retry_cooldown: Duration::from_secs(1),
            max_attempts: defaults.max_attempts,
            max_queue_size: None,
        }
    }

    /// Engine configuration derived from these settings.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            batch_size: self.batch_size,
            process_delay: self.process_delay,
            min_process_delay: self.min_process_delay,
            max_attempts: self.max_attempts,
            retry_cooldown: self.retry_cooldown,
            max_queue_size: self.max_queue_size,
            deduplicate_items: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_service_limits() {
        let catalog = ClientSettings::catalog();
        assert_eq!(catalog.min_process_delay, Duration::from_secs(10));
        assert_eq!(catalog.batch_size, 100);

        let groups = ClientSettings::groups();
        assert_eq!(groups.batch_size, 50);
        assert_eq!(groups.cache_ttl, Duration::from_secs(300));
        assert_eq!(groups.max_queue_size, None);

        for preset in [ClientSettings::users(), ClientSettings::thumbnails()] {
            assert_eq!(preset.process_delay, Duration::from_millis(100));
            assert_eq!(preset.min_process_delay, Duration::from_millis(500));
            assert_eq!(preset.cache_ttl, Duration::from_secs(60));
            assert_eq!(preset.retry_cooldown, Duration::from_secs(1));
        }
    }

    #[test]
    fn batch_config_carries_settings() {
        let settings = ClientSettings { max_queue_size: Some(10), ..ClientSettings::groups() };
        let config = settings.batch_config();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.max_queue_size, Some(10));
        assert!(config.deduplicate_items);
        assert!(config.validate().is_ok());
    }
}
