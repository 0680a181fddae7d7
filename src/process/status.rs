//! Terminal status of a reaped or stopped process

use std::fmt;

use nix::sys::wait::WaitStatus;

/// How a process ended (or paused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Normal exit with a code in 0..=255
    Exited(i32),
    /// Terminated by a signal
    Signaled(i32),
    /// Stopped by a signal; the process still exists
    Stopped(i32),
}

impl ExitStatus {
    /// Single integer view: the exit code, or the signal number for the
    /// signaled and stopped cases. The three cases can collide.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Exited(code) => code,
            ExitStatus::Signaled(signal) | ExitStatus::Stopped(signal) => signal,
        }
    }

    pub fn success(self) -> bool {
        self == ExitStatus::Exited(0)
    }

    /// True once the process is gone and its status has been collected
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExitStatus::Stopped(_))
    }

    pub(crate) fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitStatus::Signaled(signal as i32)),
            WaitStatus::Stopped(_, signal) => Some(ExitStatus::Stopped(signal as i32)),
            _ => None,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exited with code {}", code),
            ExitStatus::Signaled(signal) => write!(f, "killed by signal {}", signal),
            ExitStatus::Stopped(signal) => write!(f, "stopped by signal {}", signal),
        }
    }
}
