//! Configuration management for proctree
//!
//! Loading and saving live in [`loader`]; this module holds the settings
//! themselves and their defaults.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use loader::{ConfigFormat, ConfigLoader, LoadOptions};

/// Main configuration structure for proctree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Defaults for spawned processes
    pub process: ProcessDefaults,

    /// Graceful shutdown timing
    pub shutdown: ShutdownConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    pub level: String,

    /// Include the event target (module path) in log lines
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}

/// Stdio policy applied to new process configurations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessDefaults {
    /// Keep the child's stdout/stderr attached instead of discarding them
    pub capture_stdout: bool,

    /// Let the child read the parent's stdin
    pub allow_stdin: bool,
}

impl Default for ProcessDefaults {
    fn default() -> Self {
        Self {
            capture_stdout: true,
            allow_stdin: true,
        }
    }
}

/// Graceful shutdown timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time between SIGTERM and SIGKILL
    pub grace_period_ms: u64,

    /// How often liveness is polled during the grace period
    pub poll_interval_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 5000, // 5 seconds
            poll_interval_ms: 50,
        }
    }
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
