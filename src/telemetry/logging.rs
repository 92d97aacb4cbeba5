//! Logging configuration and initialization.
//!
//! Engines and façades only emit `tracing` events; installing a subscriber
//! is left to the embedding process. `init_logging` is a convenience for
//! binaries and examples.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging (default for services).
    #[default]
    Json,
    /// Human-readable output for terminals.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(LogError::InvalidFormat(other.to_string())),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter directive, e.g. "info" or "coalesce_core::scheduler=debug".
    /// `RUST_LOG` wins when set.
    pub level: String,
    /// Optional file path for log output. If None, logs to stderr.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),
    #[error("Failed to open log file: {0}")]
    FileOpen(String),
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = build_filter(&config.level)?;

    match config.format {
        LogFormat::Json => init_json_subscriber(filter, &config.output_path),
        LogFormat::Pretty => init_pretty_subscriber(filter),
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LogError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LogError::InvalidFilter(e.to_string()))
}

fn init_json_subscriber(filter: EnvFilter, path: &Option<PathBuf>) -> Result<(), LogError> {
    let registry = tracing_subscriber::registry().with(filter);

    if let Some(path) = path {
        let file = std::fs::File::create(path).map_err(|e| LogError::FileOpen(e.to_string()))?;
        registry
            .with(fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)?;
    } else {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)?;
    }

    Ok(())
}

fn init_pretty_subscriber(filter: EnvFilter) -> Result<(), LogError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .try_init()
        .map_err(|_| LogError::AlreadyInitialized)?;
    Ok(())
}
