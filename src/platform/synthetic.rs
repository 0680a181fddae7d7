//! In-memory process table
//!
//! A [`ProcessInspector`] over a declared set of processes, used to exercise
//! tree logic without touching the host's process table.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::PathBuf;

use super::traits::{InspectError, ProcessInspector};

#[derive(Debug, Clone, Default)]
pub struct SyntheticInspector {
    processes: BTreeMap<u32, Option<PathBuf>>,
    children: HashMap<u32, Vec<u32>>,
    failing: HashSet<u32>,
}

impl SyntheticInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live process running `exe`
    pub fn with_process(mut self, pid: u32, exe: impl Into<PathBuf>) -> Self {
        self.add_process(pid, exe);
        self
    }

    /// Register `child` as a direct child of `parent`
    pub fn with_child(mut self, parent: u32, child: u32) -> Self {
        self.add_child(parent, child);
        self
    }

    /// Make listing the children of `pid` fail, as if it exited mid-query
    pub fn with_failing_listing(mut self, pid: u32) -> Self {
        self.failing.insert(pid);
        self
    }

    pub fn add_process(&mut self, pid: u32, exe: impl Into<PathBuf>) {
        self.processes.insert(pid, Some(exe.into()));
    }

    pub fn add_child(&mut self, parent: u32, child: u32) {
        self.processes.entry(parent).or_insert(None);
        self.processes.entry(child).or_insert(None);
        self.children.entry(parent).or_default().push(child);
    }
}

fn vanished() -> io::Error {
    io::Error::from(io::ErrorKind::NotFound)
}

impl ProcessInspector for SyntheticInspector {
    fn child_pids(&self, pid: u32) -> Result<Vec<u32>, InspectError> {
        if self.failing.contains(&pid) || !self.processes.contains_key(&pid) {
            return Err(InspectError::ChildListing {
                pid,
                source: vanished(),
            });
        }
        Ok(self.children.get(&pid).cloned().unwrap_or_default())
    }

    fn executable_path(&self, pid: u32) -> Result<PathBuf, InspectError> {
        self.processes
            .get(&pid)
            .cloned()
            .flatten()
            .ok_or_else(|| InspectError::ExecutablePath {
                pid,
                source: vanished(),
            })
    }

    fn all_pids(&self) -> Result<Vec<u32>, InspectError> {
        Ok(self.processes.keys().copied().collect())
    }
}
