//! Configuration loading from environment variables and TOML files.
//!
//! Values are read from `COALESCE_*` environment variables with sensible
//! defaults. Invalid values fall back to defaults without crashing. A TOML
//! document can be layered on top with `load_from_toml`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `COALESCE_BATCH_SIZE` | 100 | Max items per dispatch |
//! | `COALESCE_PROCESS_DELAY_MS` | 0 | Wait before dispatching a partial batch |
//! | `COALESCE_MIN_PROCESS_DELAY_MS` | 0 | Min gap between dispatch starts |
//! | `COALESCE_MAX_ATTEMPTS` | 5 | Dispatch attempts per item |
//! | `COALESCE_RETRY_COOLDOWN_MS` | 500 | Wait before re-queueing an item |
//! | `COALESCE_MAX_QUEUE_SIZE` | 0 | Queue bound (0 = unbounded) |
//! | `COALESCE_LOG_LEVEL` | info | Log filter directive |
//! | `COALESCE_LOG_FORMAT` | json | `json` or `pretty` |
//!
//! Each façade reads the same engine keys plus `CACHE_TTL_MS` under its own
//! prefix, e.g. `COALESCE_CATALOG_MIN_PROCESS_DELAY_MS` or
//! `COALESCE_GROUPS_MAX_QUEUE_SIZE`. Prefixes are `CATALOG`, `USERS`,
//! `GROUPS` and `THUMBNAILS`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clients::ClientSettings;
use crate::scheduler::BatchConfig;
use crate::telemetry::{LogConfig, LogFormat};

/// All configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    /// Settings for engines built directly on `BatchEngine`.
    pub engine: BatchConfig,
    pub catalog: ClientSettings,
    pub users: ClientSettings,
    pub groups: ClientSettings,
    pub thumbnails: ClientSettings,
    pub log: LogConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            engine: BatchConfig::default(),
            catalog: ClientSettings::catalog(),
            users: ClientSettings::users(),
            groups: ClientSettings::groups(),
            thumbnails: ClientSettings::thumbnails(),
            log: LogConfig::default(),
        }
    }
}

/// Effective engine values (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSummary {
    pub batch_size: usize,
    pub process_delay_ms: u64,
    pub min_process_delay_ms: u64,
    pub max_attempts: u32,
    pub retry_cooldown_ms: u64,
    /// 0 means unbounded.
    pub max_queue_size: usize,
}

/// Effective façade values (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    #[serde(flatten)]
    pub engine: EngineSummary,
    pub cache_ttl_ms: u64,
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub engine: EngineSummary,
    pub catalog: ClientSummary,
    pub users: ClientSummary,
    pub groups: ClientSummary,
    pub thumbnails: ClientSummary,
    pub log_level: String,
    pub log_format: String,
}

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    Read(String),
    #[error("Invalid config file: {0}")]
    Parse(String),
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u32` env var, returning `default` on missing or invalid.
fn parse_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u32>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a millisecond env var, returning `default` on missing or invalid.
fn parse_millis(key: &str, default: Duration) -> Duration {
    match std::env::var(key) {
        Ok(val) => val.parse::<u64>().map(Duration::from_millis).unwrap_or(default),
        Err(_) => default,
    }
}

/// 0 or missing means unbounded.
fn parse_queue_size(key: &str, default: Option<usize>) -> Option<usize> {
    let raw = parse_usize(key, default.unwrap_or(0));
    (raw > 0).then_some(raw)
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Load engine configuration from environment.
fn load_engine_config() -> BatchConfig {
    let defaults = BatchConfig::default();
    let batch_size = parse_usize("COALESCE_BATCH_SIZE", defaults.batch_size).max(1);
    let max_attempts = parse_u32("COALESCE_MAX_ATTEMPTS", defaults.max_attempts).max(1);
    BatchConfig {
        batch_size,
        process_delay: parse_millis("COALESCE_PROCESS_DELAY_MS", defaults.process_delay),
        min_process_delay: parse_millis("COALESCE_MIN_PROCESS_DELAY_MS", defaults.min_process_delay),
        max_attempts,
        retry_cooldown: parse_millis("COALESCE_RETRY_COOLDOWN_MS", defaults.retry_cooldown),
        max_queue_size: parse_queue_size("COALESCE_MAX_QUEUE_SIZE", defaults.max_queue_size),
        deduplicate_items: defaults.deduplicate_items,
    }
}

/// Load one façade's settings from `{prefix}_*`, starting from `preset`.
fn load_client_settings(prefix: &str, preset: ClientSettings) -> ClientSettings {
    let key = |suffix: &str| format!("{prefix}_{suffix}");
    ClientSettings {
        process_delay: parse_millis(&key("PROCESS_DELAY_MS"), preset.process_delay),
        min_process_delay: parse_millis(&key("MIN_PROCESS_DELAY_MS"), preset.min_process_delay),
        batch_size: parse_usize(&key("BATCH_SIZE"), preset.batch_size).max(1),
        cache_ttl: parse_millis(&key("CACHE_TTL_MS"), preset.cache_ttl),
        retry_cooldown: parse_millis(&key("RETRY_COOLDOWN_MS"), preset.retry_cooldown),
        max_attempts: parse_u32(&key("MAX_ATTEMPTS"), preset.max_attempts).max(1),
        max_queue_size: parse_queue_size(&key("MAX_QUEUE_SIZE"), preset.max_queue_size),
    }
}

/// Load logging configuration from environment.
fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let level = std::env::var("COALESCE_LOG_LEVEL")
        .ok()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or(defaults.level);
    let format = std::env::var("COALESCE_LOG_FORMAT")
        .ok()
        .and_then(|format| format.parse::<LogFormat>().ok())
        .unwrap_or(defaults.format);
    LogConfig { format, level, output_path: None }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    EnvConfig {
        engine: load_engine_config(),
        catalog: load_client_settings("COALESCE_CATALOG", ClientSettings::catalog()),
        users: load_client_settings("COALESCE_USERS", ClientSettings::users()),
        groups: load_client_settings("COALESCE_GROUPS", ClientSettings::groups()),
        thumbnails: load_client_settings("COALESCE_THUMBNAILS", ClientSettings::thumbnails()),
        log: load_log_config(),
    }
}

/// Load from the environment, then apply the TOML document `source` on top.
pub fn load_from_toml(source: &str) -> Result<EnvConfig, ConfigFileError> {
    let mut config = load();
    config.apply_toml(source)?;
    Ok(config)
}

/// Like `load_from_toml`, reading the document from `path`.
pub fn load_from_file(path: &std::path::Path) -> Result<EnvConfig, ConfigFileError> {
    let source = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Read(e.to_string()))?;
    load_from_toml(&source)
}

// TOML shape: every field optional, unknown keys rejected.

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    engine: Option<FileEngine>,
    catalog: Option<FileClient>,
    users: Option<FileClient>,
    groups: Option<FileClient>,
    thumbnails: Option<FileClient>,
    log: Option<FileLog>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileEngine {
    batch_size: Option<usize>,
    process_delay_ms: Option<u64>,
    min_process_delay_ms: Option<u64>,
    max_attempts: Option<u32>,
    retry_cooldown_ms: Option<u64>,
    max_queue_size: Option<usize>,
    deduplicate_items: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileClient {
    batch_size: Option<usize>,
    process_delay_ms: Option<u64>,
    min_process_delay_ms: Option<u64>,
    max_attempts: Option<u32>,
    retry_cooldown_ms: Option<u64>,
    max_queue_size: Option<usize>,
    cache_ttl_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLog {
    level: Option<String>,
    format: Option<String>,
}

impl FileClient {
    fn apply(self, settings: &mut ClientSettings) {
        if let Some(v) = self.batch_size {
            settings.batch_size = v.max(1);
        }
        if let Some(v) = self.process_delay_ms {
            settings.process_delay = Duration::from_millis(v);
        }
        if let Some(v) = self.min_process_delay_ms {
            settings.min_process_delay = Duration::from_millis(v);
        }
        if let Some(v) = self.max_attempts {
            settings.max_attempts = v.max(1);
        }
        if let Some(v) = self.retry_cooldown_ms {
            settings.retry_cooldown = Duration::from_millis(v);
        }
        if let Some(v) = self.max_queue_size {
            settings.max_queue_size = (v > 0).then_some(v);
        }
        if let Some(v) = self.cache_ttl_ms {
            settings.cache_ttl = Duration::from_millis(v);
        }
    }
}

impl EnvConfig {
    /// Overlay the TOML document `source` onto this configuration.
    pub fn apply_toml(&mut self, source: &str) -> Result<(), ConfigFileError> {
        let file: FileConfig = toml::from_str(source).map_err(|e| ConfigFileError::Parse(e.to_string()))?;

        if let Some(engine) = file.engine {
            if let Some(v) = engine.batch_size {
                self.engine.batch_size = v.max(1);
            }
            if let Some(v) = engine.process_delay_ms {
                self.engine.process_delay = Duration::from_millis(v);
            }
            if let Some(v) = engine.min_process_delay_ms {
                self.engine.min_process_delay = Duration::from_millis(v);
            }
            if let Some(v) = engine.max_attempts {
                self.engine.max_attempts = v.max(1);
            }
            if let Some(v) = engine.retry_cooldown_ms {
                self.engine.retry_cooldown = Duration::from_millis(v);
            }
            if let Some(v) = engine.max_queue_size {
                self.engine.max_queue_size = (v > 0).then_some(v);
            }
            if let Some(v) = engine.deduplicate_items {
                self.engine.deduplicate_items = v;
            }
        }

        for (section, settings) in [
            (file.catalog, &mut self.catalog),
            (file.users, &mut self.users),
            (file.groups, &mut self.groups),
            (file.thumbnails, &mut self.thumbnails),
        ] {
            if let Some(section) = section {
                section.apply(settings);
            }
        }

        if let Some(log) = file.log {
            if let Some(level) = log.level {
                self.log.level = level;
            }
            if let Some(format) = log.format {
                self.log.format = format
                    .parse::<LogFormat>()
                    .map_err(|e| ConfigFileError::Parse(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            engine: engine_summary(&self.engine),
            catalog: client_summary(&self.catalog),
            users: client_summary(&self.users),
            groups: client_summary(&self.groups),
            thumbnails: client_summary(&self.thumbnails),
            log_level: self.log.level.clone(),
            log_format: match self.log.format {
                LogFormat::Json => "json".to_string(),
                LogFormat::Pretty => "pretty".to_string(),
            },
        }
    }

    /// Façade settings by name.
    pub fn clients(&self) -> [(&'static str, &ClientSettings); 4] {
        [
            ("catalog", &self.catalog),
            ("users", &self.users),
            ("groups", &self.groups),
            ("thumbnails", &self.thumbnails),
        ]
    }
}

fn engine_summary(config: &BatchConfig) -> EngineSummary {
    EngineSummary {
        batch_size: config.batch_size,
        process_delay_ms: as_millis(config.process_delay),
        min_process_delay_ms: as_millis(config.min_process_delay),
        max_attempts: config.max_attempts,
        retry_cooldown_ms: as_millis(config.retry_cooldown),
        max_queue_size: config.max_queue_size.unwrap_or(0),
    }
}

fn client_summary(settings: &ClientSettings) -> ClientSummary {
    ClientSummary {
        engine: engine_summary(&settings.batch_config()),
        cache_ttl_ms: as_millis(settings.cache_ttl),
    }
}

impl EffectiveConfig {
    /// Values as `(ENV_VAR, value)` pairs in documentation order.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = engine_pairs("COALESCE", &self.engine);
        for (prefix, client) in [
            ("COALESCE_CATALOG", &self.catalog),
            ("COALESCE_USERS", &self.users),
            ("COALESCE_GROUPS", &self.groups),
            ("COALESCE_THUMBNAILS", &self.thumbnails),
        ] {
            pairs.extend(engine_pairs(prefix, &client.engine));
            pairs.push((format!("{prefix}_CACHE_TTL_MS"), client.cache_ttl_ms.to_string()));
        }
        pairs.push(("COALESCE_LOG_LEVEL".to_string(), self.log_level.clone()));
        pairs.push(("COALESCE_LOG_FORMAT".to_string(), self.log_format.clone()));
        pairs
    }
}

fn engine_pairs(prefix: &str, engine: &EngineSummary) -> Vec<(String, String)> {
    vec![
        (format!("{prefix}_BATCH_SIZE"), engine.batch_size.to_string()),
        (format!("{prefix}_PROCESS_DELAY_MS"), engine.process_delay_ms.to_string()),
        (format!("{prefix}_MIN_PROCESS_DELAY_MS"), engine.min_process_delay_ms.to_string()),
        (format!("{prefix}_MAX_ATTEMPTS"), engine.max_attempts.to_string()),
        (format!("{prefix}_RETRY_COOLDOWN_MS"), engine.retry_cooldown_ms.to_string()),
        (format!("{prefix}_MAX_QUEUE_SIZE"), engine.max_queue_size.to_string()),
    ]
}
