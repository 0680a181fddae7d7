//! Platform abstraction layer
//!
//! This module provides a unified interface for platform-specific operations.
//! Process inspection has two strategies chosen at build time: the `/proc`
//! kernel task files on Linux and the libproc API on macOS. Everything above
//! this module only talks to the [`ProcessInspector`] and [`SignalDispatcher`]
//! traits.

pub mod synthetic;
mod traits;
#[cfg(unix)]
mod unix;
mod walk;

pub use traits::*;
#[cfg(target_os = "macos")]
pub use unix::LibprocInspector;
#[cfg(target_os = "linux")]
pub use unix::ProcfsInspector;
#[cfg(unix)]
pub use unix::UnixSignals;
pub use walk::DescendantScan;

/// Platform implementation factory
pub struct Platform;

impl Platform {
    /// Get the platform-specific signal operations
    pub fn signals() -> Box<dyn SignalDispatcher> {
        #[cfg(unix)]
        {
            Box::new(unix::UnixSignals::new())
        }

        #[cfg(not(unix))]
        {
            compile_error!("Unsupported platform");
        }
    }

    /// Get the platform-specific process inspector
    pub fn inspector() -> Box<dyn ProcessInspector> {
        #[cfg(target_os = "linux")]
        {
            Box::new(unix::ProcfsInspector::new())
        }

        #[cfg(target_os = "macos")]
        {
            Box::new(unix::LibprocInspector::new())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            compile_error!("Unsupported platform");
        }
    }
}
