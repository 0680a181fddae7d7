//! Error types and Result aliases for proctree

use std::fmt;
use std::path::PathBuf;

use crate::platform::InspectError;

/// Result type alias for proctree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for proctree
#[derive(Debug)]
pub enum Error {
    // === Process lifecycle errors ===
    /// Failed to create the child process or replace its image
    SpawnFailed {
        command: String,
        reason: String,
    },

    /// Handle was already started; it cannot be reconfigured or restarted
    AlreadyStarted {
        command: String,
    },

    /// Operation requires a started process
    NotStarted,

    /// The OS wait call failed
    WaitFailed {
        pid: u32,
        errno: nix::errno::Errno,
    },

    // === Process tree errors ===
    /// Descendant discovery or executable lookup failed
    Enumeration(InspectError),

    /// Failed to deliver a signal to a process
    SignalSendFailed {
        pid: u32,
        signal: String,
        reason: String,
    },

    /// System-wide process search failed
    ProcessSearchFailed {
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O errors ===
    /// I/O errors
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Process lifecycle errors
            Error::SpawnFailed { command, reason } => {
                write!(f, "Failed to spawn command '{}': {}", command, reason)
            }
            Error::AlreadyStarted { command } => {
                write!(f, "Process '{}' was already started", command)
            }
            Error::NotStarted => {
                write!(f, "Process has not been started")
            }
            Error::WaitFailed { pid, errno } => {
                write!(f, "Could not wait on process {}: {}", pid, errno)
            }

            // Process tree errors
            Error::Enumeration(err) => write!(f, "Process enumeration failed: {}", err),
            Error::SignalSendFailed {
                pid,
                signal,
                reason,
            } => {
                write!(
                    f,
                    "Failed to send signal {} to process {}: {}",
                    signal, pid, reason
                )
            }
            Error::ProcessSearchFailed { reason } => {
                write!(f, "Can not search system processes: {}", reason)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Enumeration(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InspectError> for Error {
    fn from(err: InspectError) -> Self {
        Error::Enumeration(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
