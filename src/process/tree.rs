//! Process Tree Management
//!
//! Delivers signals across the descendants of a process. Uses the platform
//! abstraction for descendant discovery and signal delivery.

use crate::error::Result;
use crate::platform::{Platform, ProcessInspector, Signal, SignalDispatcher};

/// Which part of a tree a signal reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeScope {
    /// Every descendant of the root, but not the root itself
    DescendantsOnly,
    /// Every descendant, then the root
    WholeTree,
}

pub struct ProcessTreeController {
    inspector: Box<dyn ProcessInspector>,
    signals: Box<dyn SignalDispatcher>,
}

impl ProcessTreeController {
    /// Controller backed by the host platform
    pub fn new() -> Self {
        Self::with_ops(Platform::inspector(), Platform::signals())
    }

    pub fn with_ops(
        inspector: Box<dyn ProcessInspector>,
        signals: Box<dyn SignalDispatcher>,
    ) -> Self {
        Self { inspector, signals }
    }

    pub fn signals(&self) -> &dyn SignalDispatcher {
        self.signals.as_ref()
    }

    /// Send `signal` to every descendant of `root_pid`, deepest first.
    ///
    /// The root itself is not signaled. If the descendant set cannot be
    /// computed nothing is sent. Returns the pids that were targeted.
    pub fn signal_tree(&self, root_pid: u32, signal: Signal) -> Result<Vec<u32>> {
        let descendants = self.inspector.descendants_of(root_pid).map_err(|e| {
            warn!("Not sending {} under process {}: {}", signal, root_pid, e);
            e
        })?;

        debug!(
            "Sending {} to {} descendants of process {}",
            signal,
            descendants.len(),
            root_pid
        );
        self.signals.signal_all(&descendants, signal);
        Ok(descendants)
    }

    /// Send `signal` to the descendants that can still be found, then to the
    /// root. Unlisted subtrees are skipped rather than aborting the call.
    pub fn signal_whole_tree(&self, root_pid: u32, signal: Signal) -> Vec<u32> {
        let scan = self.inspector.descendants_best_effort(root_pid);
        if !scan.complete {
            warn!(
                "Descendants of process {} only partially known, sending {} anyway",
                root_pid, signal
            );
        }

        let mut targets = scan.pids;
        targets.push(root_pid);
        self.signals.signal_all(&targets, signal);
        targets
    }

    pub fn signal_scoped(&self, root_pid: u32, signal: Signal, scope: TreeScope) -> Result<Vec<u32>> {
        match scope {
            TreeScope::DescendantsOnly => self.signal_tree(root_pid, signal),
            TreeScope::WholeTree => Ok(self.signal_whole_tree(root_pid, signal)),
        }
    }

    /// SIGTERM to every descendant of `root_pid` (not the root)
    pub fn terminate_tree(&self, root_pid: u32) -> Result<Vec<u32>> {
        self.signal_tree(root_pid, Signal::Terminate)
    }

    /// SIGKILL to every descendant of `root_pid` (not the root)
    pub fn kill_tree(&self, root_pid: u32) -> Result<Vec<u32>> {
        self.signal_tree(root_pid, Signal::Kill)
    }

    /// The subset of `pids` that still exist
    pub fn still_alive(&self, pids: &[u32]) -> Vec<u32> {
        pids.iter()
            .copied()
            .filter(|&pid| self.signals.is_alive(pid))
            .collect()
    }
}

impl Default for ProcessTreeController {
    fn default() -> Self {
        Self::new()
    }
}
