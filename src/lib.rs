//! proctree - spawn, reap and terminate process trees
//!
//! This library owns the lifecycle of external commands: spawning them,
//! tracking their liveness, reaping their exit status, and terminating them
//! together with every descendant they may have spawned.
//!
//! ## Module Organization
//!
//! - [`process`] - [`ProcessHandle`], tree-wide signaling, process search
//! - [`platform`] - Descendant discovery and signal delivery per OS
//! - [`config`] - Configuration loading and defaults
//! - [`logging`] - `tracing` subscriber setup
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use proctree::{ProcessConfig, ProcessHandle};
//!
//! # fn main() -> proctree::Result<()> {
//! let mut handle = ProcessHandle::with_config(
//!     ProcessConfig::new("sleep").arg("30").capture_stdout(false),
//! );
//! handle.start_async()?;
//! assert!(handle.is_running());
//!
//! // stop the whole tree and reap it
//! handle.kill_all()?;
//! handle.wait()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Support
//!
//! - Linux: children and executables read from `/proc`
//! - macOS: children and executables read through libproc
//!
//! ## Termination scope
//!
//! [`ProcessHandle::terminate`] and [`ProcessHandle::kill`] (and
//! [`ProcessTreeController::terminate_tree`] / [`ProcessTreeController::kill_tree`])
//! signal the **descendants** of a process, never the process itself. Use the
//! `*_all` variants or [`TreeScope::WholeTree`] to include the root. Dropping a
//! [`ProcessHandle`] always kills the whole tree before reaping.

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod process;

// Re-exports for core functionality
pub use config::{Config, ConfigLoader};
pub use error::{Error, Result};
pub use platform::{DescendantScan, InspectError, Platform, ProcessInspector, Signal, SignalDispatcher};
pub use process::{
    ExitStatus, ProcessConfig, ProcessFinder, ProcessHandle, ProcessTreeController, TreeScope,
};

// Version information
/// The current version of proctree from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration and install logging.
///
/// Uses `config_path` when given, otherwise the default search paths; falls
/// back to defaults when nothing can be loaded.
pub fn init(config_path: Option<&std::path::Path>, debug: bool) -> Config {
    let loaded = match config_path {
        Some(path) => ConfigLoader::load_from_path(path),
        None => ConfigLoader::load(),
    };

    // logging is not up yet, so remember the failure and report it afterwards
    let (config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    logging::init_logging(&config.logging, debug);
    if let Some(e) = load_error {
        warn!("Failed to load configuration: {}. Using defaults", e);
    }

    debug!("{} v{} initialized", NAME, VERSION);
    config
}
