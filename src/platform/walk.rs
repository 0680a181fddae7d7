//! Descendant enumeration
//!
//! Walks a process tree with an explicit worklist and emits every process
//! after all of its own descendants (post-order). The queried root is never
//! part of the output.

use std::collections::HashSet;

use super::traits::{InspectError, ProcessInspector};

/// Result of a best-effort descendant walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescendantScan {
    /// Descendants found, deepest first
    pub pids: Vec<u32>,
    /// False when at least one subtree could not be listed
    pub complete: bool,
}

struct Frame {
    pid: u32,
    children: std::vec::IntoIter<u32>,
}

pub(crate) fn descendants_strict<I>(inspector: &I, root: u32) -> Result<Vec<u32>, InspectError>
where
    I: ProcessInspector + ?Sized,
{
    walk(inspector, root, |_, err| Err(err))
}

pub(crate) fn descendants_best_effort<I>(inspector: &I, root: u32) -> DescendantScan
where
    I: ProcessInspector + ?Sized,
{
    let mut complete = true;
    let walked = walk(inspector, root, |pid, err| {
        debug!("Skipping subtree of process {}: {}", pid, err);
        complete = false;
        Ok(())
    });

    match walked {
        Ok(pids) => DescendantScan { pids, complete },
        // the failure handler above never returns an error
        Err(_) => DescendantScan {
            pids: Vec::new(),
            complete: false,
        },
    }
}

/// Post-order walk. `on_failure` decides whether a listing failure aborts
/// the walk (return `Err`) or turns the failed node into a leaf.
fn walk<I, F>(inspector: &I, root: u32, mut on_failure: F) -> Result<Vec<u32>, InspectError>
where
    I: ProcessInspector + ?Sized,
    F: FnMut(u32, InspectError) -> Result<(), InspectError>,
{
    let mut list = |pid: u32| -> Result<Vec<u32>, InspectError> {
        match inspector.child_pids(pid) {
            Ok(children) => Ok(children),
            Err(err) => on_failure(pid, err).map(|()| Vec::new()),
        }
    };

    let mut ordered = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(root);

    let mut stack = vec![Frame {
        pid: root,
        children: list(root)?.into_iter(),
    }];

    while let Some(frame) = stack.last_mut() {
        match frame.children.next() {
            Some(child) => {
                // pid reuse can make a listing point back up the tree
                if !visited.insert(child) {
                    continue;
                }
                let children = list(child)?;
                stack.push(Frame {
                    pid: child,
                    children: children.into_iter(),
                });
            }
            None => {
                let pid = frame.pid;
                stack.pop();
                if pid != root {
                    ordered.push(pid);
                }
            }
        }
    }

    Ok(ordered)
}
