//! Locate running processes by executable identity

use std::path::Path;

use crate::error::{Error, Result};
use crate::platform::{Platform, ProcessInspector, Signal, SignalDispatcher};

/// Whether `resolved` (a process's executable path) matches `query`.
///
/// An absolute query must equal the full path; anything else is compared
/// with the path's final component.
pub fn matches_executable(resolved: &Path, query: &str) -> bool {
    let query = Path::new(query);
    if query.is_absolute() {
        resolved == query
    } else {
        resolved.file_name() == Some(query.as_os_str())
    }
}

pub struct ProcessFinder {
    inspector: Box<dyn ProcessInspector>,
    signals: Box<dyn SignalDispatcher>,
}

impl ProcessFinder {
    pub fn new() -> Self {
        Self::with_ops(Platform::inspector(), Platform::signals())
    }

    pub fn with_ops(
        inspector: Box<dyn ProcessInspector>,
        signals: Box<dyn SignalDispatcher>,
    ) -> Self {
        Self { inspector, signals }
    }

    /// Every live process whose executable matches `name_or_path`
    pub fn find(&self, name_or_path: &str) -> Result<Vec<u32>> {
        let pids = self
            .inspector
            .all_pids()
            .map_err(|e| Error::ProcessSearchFailed {
                reason: e.to_string(),
            })?;

        let mut matched = Vec::new();
        for pid in pids.into_iter().filter(|&pid| pid != 0) {
            // unreadable (other users' processes) or already gone
            let Ok(exe) = self.inspector.executable_path(pid) else {
                continue;
            };
            if matches_executable(&exe, name_or_path) {
                matched.push(pid);
            }
        }

        debug!("Found {} processes matching '{}'", matched.len(), name_or_path);
        Ok(matched)
    }

    /// Send SIGTERM to every process running `tool`.
    ///
    /// Best-effort: delivery failures are logged, nothing checks that the
    /// processes actually stop, and there is no escalation to SIGKILL.
    /// The calling process is never signaled. Returns the pids attempted.
    pub fn stop_tool(&self, tool: &str) -> Result<Vec<u32>> {
        let own_pid = std::process::id();
        let pids = self.find(tool).map_err(|e| {
            error!("{}", e);
            e
        })?;

        let mut attempted = Vec::new();
        for pid in pids.into_iter().filter(|&pid| pid != own_pid) {
            info!("Killing process: {}", pid);
            if let Err(e) = self.signals.send(pid, Signal::Terminate) {
                error!(
                    "{}. Check that you have the necessary permissions.",
                    e
                );
            }
            info!("Stopping {}", tool);
            attempted.push(pid);
        }

        Ok(attempted)
    }
}

impl Default for ProcessFinder {
    fn default() -> Self {
        Self::new()
    }
}
