//! Watcher configuration

use crate::constants::{DEFAULT_DEBOUNCE_SECS, DEFAULT_MARKER_IDENT, DEFAULT_POLL_INTERVAL_SECS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the version-marker watcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Whether the watcher runs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between modification-time polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval: f64,

    /// Seconds after a self-triggered write during which changes are ignored
    #[serde(default = "default_debounce")]
    pub debounce: f64,

    /// Identifier of the version marker line
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval: default_poll_interval(),
            debounce: default_debounce(),
            marker: default_marker(),
        }
    }
}

impl WatchConfig {
    /// Poll interval as a [`Duration`]; non-positive or non-finite values
    /// fall back to the default.
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.poll_interval)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_POLL_INTERVAL_SECS))
    }

    /// Debounce window as a [`Duration`]; invalid values mean no debounce.
    pub fn debounce(&self) -> Duration {
        Duration::try_from_secs_f64(self.debounce).unwrap_or(Duration::ZERO)
    }

    /// Validate the numeric settings, returning a description of the first
    /// problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !self.poll_interval.is_finite() || self.poll_interval <= 0.0 {
            return Err(format!("watch.poll_interval must be positive, got {}", self.poll_interval));
        }
        if !self.debounce.is_finite() || self.debounce < 0.0 {
            return Err(format!("watch.debounce must not be negative, got {}", self.debounce));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> f64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_debounce() -> f64 {
    DEFAULT_DEBOUNCE_SECS
}

fn default_marker() -> String {
    DEFAULT_MARKER_IDENT.to_string()
}
