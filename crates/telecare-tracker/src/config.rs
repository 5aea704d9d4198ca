//! Configuration management for the call session tracker

use crate::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slowest tick the `MM:SS` display tolerates
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

/// Main configuration for the tracker service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Periodic tick configuration
    #[serde(default)]
    pub tick: TickConfig,

    /// Service lifecycle configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Sample data configuration
    #[serde(default)]
    pub fixtures: FixtureConfig,
}

/// Periodic tick configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickConfig {
    /// Interval between elapsed-time refreshes in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,

    /// Interval for the active-call summary log line, 0 disables it
    #[serde(default = "default_summary_interval")]
    pub summary_interval_seconds: u64,
}

/// Sample data configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FixtureConfig {
    /// Seed the tracker with the demo calls on construction
    #[serde(default)]
    pub seed_demo_data: bool,
}

// Default value functions
const fn default_tick_interval() -> u64 {
    1000
}

fn default_service_name() -> String {
    "telecare-tracker".to_string()
}

const fn default_shutdown_timeout() -> u64 {
    5
}

const fn default_summary_interval() -> u64 {
    30
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
            summary_interval_seconds: default_summary_interval(),
        }
    }
}

impl TickConfig {
    /// Get tick interval as Duration
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl ServiceConfig {
    /// Get shutdown timeout as Duration
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    /// Get summary interval as Duration
    #[must_use]
    pub const fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_seconds)
    }
}

impl TrackerConfig {
    /// Load configuration from environment and files
    ///
    /// Reads optional `tracker.toml` and `config.toml` files, then
    /// `TELECARE_TRACKER__*` environment variables
    /// (`TELECARE_TRACKER__TICK__TICK_INTERVAL_MS=500`).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Configuration`] if:
    /// - Configuration files contain invalid syntax
    /// - Environment variables have invalid values
    /// - The resolved values fail [`TrackerConfig::validate`]
    pub fn load() -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name("tracker").required(false))
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("TELECARE_TRACKER").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Configuration`] on invalid TOML or values.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Configuration`] if the tick interval is outside
    /// `1..=1000` ms or the shutdown timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TICK_INTERVAL_MS).contains(&self.tick.tick_interval_ms) {
            return Err(TrackerError::configuration(format!(
                "tick_interval_ms must be between 1 and {MAX_TICK_INTERVAL_MS}, got {}",
                self.tick.tick_interval_ms
            )));
        }

        if self.service.shutdown_timeout_seconds == 0 {
            return Err(TrackerError::configuration(
                "shutdown_timeout_seconds must be greater than 0",
            ));
        }

        Ok(())
    }
}
