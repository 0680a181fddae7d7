//! Linux process inspection through the `/proc` filesystem

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::platform::traits::{InspectError, ProcessInspector};

/// Appended by the kernel to `/proc/<pid>/exe` once the binary is replaced or removed
const DELETED_MARKER: &[u8] = b" (deleted)";

pub struct ProcfsInspector {
    proc_root: PathBuf,
}

impl ProcfsInspector {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Inspect a procfs tree mounted somewhere other than `/proc`
    pub fn with_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    fn pid_dir(&self, pid: u32) -> PathBuf {
        self.proc_root.join(pid.to_string())
    }
}

impl Default for ProcfsInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInspector for ProcfsInspector {
    fn child_pids(&self, pid: u32) -> Result<Vec<u32>, InspectError> {
        // children are recorded per thread, so gather every task's list
        let task_dir = self.pid_dir(pid).join("task");
        let mut tasks = fs::read_dir(&task_dir)
            .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
            .map_err(|source| InspectError::ChildListing { pid, source })?;
        tasks.sort_by_key(|task| {
            task.file_name()
                .to_str()
                .and_then(|tid| tid.parse::<u32>().ok())
                .unwrap_or(u32::MAX)
        });

        let mut children = Vec::new();
        for task in tasks {
            let content = match fs::read_to_string(task.path().join("children")) {
                Ok(content) => content,
                // thread exited between listing and reading
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(InspectError::ChildListing { pid, source }),
            };

            for child in parse_pid_list(&content)? {
                if !children.contains(&child) {
                    children.push(child);
                }
            }
        }

        Ok(children)
    }

    fn executable_path(&self, pid: u32) -> Result<PathBuf, InspectError> {
        let target = fs::read_link(self.pid_dir(pid).join("exe"))
            .map_err(|source| InspectError::ExecutablePath { pid, source })?;
        Ok(strip_deleted_marker(&target))
    }

    fn all_pids(&self) -> Result<Vec<u32>, InspectError> {
        let entries = fs::read_dir(&self.proc_root)
            .map_err(|source| InspectError::ProcessListing { source })?;

        let mut pids = Vec::new();
        for entry in entries.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                pids.push(pid);
            }
        }

        Ok(pids)
    }
}

/// Parse whitespace-separated process ids
pub(crate) fn parse_pid_list(content: &str) -> Result<Vec<u32>, InspectError> {
    content
        .split_whitespace()
        .map(|text| {
            text.parse::<u32>().map_err(|_| InspectError::InvalidPid {
                text: text.to_string(),
            })
        })
        .collect()
}

/// Recover the original path from a link target like `/usr/bin/tool (deleted)`
pub(crate) fn strip_deleted_marker(target: &Path) -> PathBuf {
    let bytes = target.as_os_str().as_bytes();
    match bytes.strip_suffix(DELETED_MARKER) {
        Some(original) => PathBuf::from(OsStr::from_bytes(original)),
        None => target.to_path_buf(),
    }
}
