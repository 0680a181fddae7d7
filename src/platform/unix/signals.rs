//! Unix signal operations

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal as NixSignal};
use nix::unistd::Pid;

use crate::error::{Error, Result};
use crate::platform::traits::{Signal, SignalDispatcher};

pub struct UnixSignals;

impl UnixSignals {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert to a `nix` pid, refusing values `kill(2)` would treat as groups
pub(crate) fn to_nix_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

impl SignalDispatcher for UnixSignals {
    fn send(&self, pid: u32, signal: Signal) -> Result<()> {
        let target = to_nix_pid(pid).ok_or_else(|| Error::SignalSendFailed {
            pid,
            signal: signal.to_string(),
            reason: "not a single-process id".to_string(),
        })?;

        kill(target, signal.as_nix()).map_err(|e| Error::SignalSendFailed {
            pid,
            signal: signal.to_string(),
            reason: e.to_string(),
        })
    }

    fn is_alive(&self, pid: u32) -> bool {
        let Some(target) = to_nix_pid(pid) else {
            return false;
        };
        // EPERM still proves the process exists
        matches!(
            kill(target, None::<NixSignal>),
            Ok(()) | Err(Errno::EPERM)
        )
    }
}
