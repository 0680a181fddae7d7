//! Platform-specific operation traits
//!
//! These traits define the interface for platform-specific operations,
//! allowing for clean abstraction and easier testing.

use std::fmt;
use std::path::PathBuf;

use super::walk::{self, DescendantScan};
use crate::error::Result;

/// Failure while reading OS-exposed process state.
///
/// Almost always caused by the queried process exiting mid-query, so callers
/// should read it as "state unknown" rather than "no such relationship".
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("Failed to list children of process {pid}: {source}")]
    ChildListing { pid: u32, source: std::io::Error },

    #[error("Failed to resolve executable of process {pid}: {source}")]
    ExecutablePath { pid: u32, source: std::io::Error },

    #[error("Failed to list live processes: {source}")]
    ProcessListing { source: std::io::Error },

    #[error("Invalid process id: '{text}'")]
    InvalidPid { text: String },
}

/// Signals delivered by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Termination signal (graceful shutdown)
    Terminate,
    /// Kill signal (forceful termination)
    Kill,
}

impl Signal {
    /// The corresponding `nix` signal
    pub fn as_nix(self) -> nix::sys::signal::Signal {
        match self {
            Signal::Terminate => nix::sys::signal::Signal::SIGTERM,
            Signal::Kill => nix::sys::signal::Signal::SIGKILL,
        }
    }

    /// Raw signal number
    pub fn number(self) -> i32 {
        self.as_nix() as i32
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_nix().as_str())
    }
}

/// Read-only queries over the host's process table
pub trait ProcessInspector: Send + Sync {
    /// Direct children of `pid`
    fn child_pids(&self, pid: u32) -> std::result::Result<Vec<u32>, InspectError>;

    /// Path of the binary `pid` is executing
    fn executable_path(&self, pid: u32) -> std::result::Result<PathBuf, InspectError>;

    /// Every live process id on the host
    fn all_pids(&self) -> std::result::Result<Vec<u32>, InspectError>;

    /// All transitive descendants of `pid`, deepest first, excluding `pid`.
    ///
    /// A failure anywhere in the subtree fails the whole query; no partial
    /// list is returned.
    fn descendants_of(&self, pid: u32) -> std::result::Result<Vec<u32>, InspectError> {
        walk::descendants_strict(self, pid)
    }

    /// Like [`descendants_of`](Self::descendants_of) but skips subtrees that
    /// cannot be listed and reports the gap through [`DescendantScan::complete`].
    fn descendants_best_effort(&self, pid: u32) -> DescendantScan {
        walk::descendants_best_effort(self, pid)
    }
}

/// Platform-specific signal operations
pub trait SignalDispatcher: Send + Sync {
    /// Deliver `signal` to a single process
    fn send(&self, pid: u32, signal: Signal) -> Result<()>;

    /// Check if a process still exists (zombies included)
    fn is_alive(&self, pid: u32) -> bool;

    /// Deliver `signal` to every pid independently.
    ///
    /// Failures are logged and otherwise dropped.
    fn signal_all(&self, pids: &[u32], signal: Signal) {
        for &pid in pids {
            match self.send(pid, signal) {
                Ok(()) => debug!("Sent {} to process {}", signal, pid),
                Err(e) => warn!("{}", e),
            }
        }
    }
}
