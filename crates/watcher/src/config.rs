//! Watcher configuration
//!
//! Loaded from TOML, e.g.
//!
//! ```toml
//! poll_interval_ms = 100
//! event_buffer = 0
//! error_buffer = 0
//! ```

use crate::error::WatchError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Interval used when nothing else is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Time between ticks in milliseconds (default: 250)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Capacity of the event channel (default: 0)
    ///
    /// Zero means every send waits for the consumer to receive. A non-zero
    /// value lets the poller run ahead by that many events before blocking.
    #[serde(default)]
    pub event_buffer: usize,

    /// Capacity of the error channel (default: 0)
    #[serde(default)]
    pub error_buffer: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            event_buffer: 0,
            error_buffer: 0,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl WatcherConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Invalid watcher config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config {}", path.display()))
    }

    /// Set the interval, rounded up to whole milliseconds
    ///
    /// A non-zero sub-millisecond interval becomes 1ms; zero stays zero and
    /// fails validation.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        let millis = interval.as_nanos().div_ceil(1_000_000);
        self.poll_interval_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> std::result::Result<(), WatchError> {
        if self.poll_interval_ms == 0 {
            return Err(WatchError::InvalidInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = WatcherConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.event_buffer, 0);
        assert_eq!(config.error_buffer, 0);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = WatcherConfig::from_toml_str("").unwrap();
        assert_eq!(config, WatcherConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = WatcherConfig::from_toml_str("poll_interval_ms = 40\n").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(40));
        assert_eq!(config.event_buffer, 0);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = WatcherConfig::from_toml_str("poll_interval_ms = 0\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WatchError>(),
            Some(WatchError::InvalidInterval)
        ));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("watcher.toml");
        std::fs::write(&path, "poll_interval_ms = 100\nevent_buffer = 16\n")?;

        let config = WatcherConfig::load(&path)?;

        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.event_buffer, 16);
        assert_eq!(config.error_buffer, 0);

        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(WatcherConfig::load(&temp_dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_sub_millisecond_interval_rounds_up() {
        let config = WatcherConfig::default().with_poll_interval(Duration::from_micros(500));
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
        assert!(config.validate().is_ok());

        let config = WatcherConfig::default().with_poll_interval(Duration::from_micros(1500));
        assert_eq!(config.poll_interval(), Duration::from_millis(2));

        let config = WatcherConfig::default().with_poll_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(WatchError::InvalidInterval)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = WatcherConfig::default().with_poll_interval(Duration::from_millis(75));
        let text = toml::to_string(&config).unwrap();
        assert_eq!(WatcherConfig::from_toml_str(&text).unwrap(), config);
    }
}
