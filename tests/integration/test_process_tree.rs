//! Integration Tests for descendant discovery and tree signaling
//!
//! Builds small shell process trees and checks enumeration order and which
//! processes receive signals.

#[path = "../common/mod.rs"]
mod common;

use common::{is_defunct, spawn_sh, wait_for, wait_for_descendants, DEADLINE};
use proctree::{Platform, ProcessConfig, ProcessHandle, ProcessTreeController};
use std::time::Duration;

#[test]
fn test_leaf_process_has_no_descendants() {
    let mut handle = ProcessHandle::with_config(ProcessConfig::new("sleep").arg("30"));
    let pid = handle.start_async().unwrap();

    let descendants = Platform::inspector().descendants_of(pid).unwrap();
    assert!(descendants.is_empty());
}

#[test]
fn test_three_level_tree_is_post_order() {
    let handle = spawn_sh("sh -c 'sleep 30; true' & wait");
    let root = handle.pid().unwrap();
    let descendants = wait_for_descendants(root, 2);

    assert!(!descendants.contains(&root));

    let inspector = Platform::inspector();
    let (grandchild, child) = (descendants[0], descendants[1]);
    assert_eq!(inspector.child_pids(root).unwrap(), vec![child]);
    assert_eq!(inspector.child_pids(child).unwrap(), vec![grandchild]);
}

#[test]
fn test_terminate_signals_all_descendants() {
    let mut handle = spawn_sh("sleep 30 & sleep 30 & sleep 30 & wait");
    let root = handle.pid().unwrap();
    let descendants = wait_for_descendants(root, 3);

    let mut signaled = handle.terminate().unwrap();
    signaled.sort_unstable();
    let mut expected = descendants.clone();
    expected.sort_unstable();
    assert_eq!(signaled, expected);

    for pid in descendants {
        let gone = wait_for(DEADLINE, || is_defunct(pid).then_some(()));
        assert!(gone.is_some(), "descendant {} survived SIGTERM", pid);
    }

    // with its children gone the shell's `wait` returns and it exits on its own
    let exited = wait_for(DEADLINE, || (!handle.is_running()).then_some(()));
    assert!(exited.is_some());
}

#[test]
fn test_kill_leaves_root_running() {
    let mut handle = spawn_sh("sleep 30; sleep 30");
    let root = handle.pid().unwrap();
    let first = wait_for_descendants(root, 1);

    let signaled = handle.kill().unwrap();
    assert_eq!(signaled, first);
    assert!(!signaled.contains(&root));

    // the shell moves on to its second sleep
    let replaced = wait_for(DEADLINE, || {
        Platform::inspector()
            .descendants_of(root)
            .ok()
            .filter(|pids| pids.len() == 1 && pids != &first)
    });
    assert!(replaced.is_some(), "shell did not start its next command");
    assert!(handle.is_running());
}

#[test]
fn test_kill_all_includes_root() {
    let mut handle = spawn_sh("sleep 30 & wait");
    let root = handle.pid().unwrap();
    let descendants = wait_for_descendants(root, 1);

    let signaled = handle.kill_all().unwrap();
    assert_eq!(signaled.last(), Some(&root));
    assert!(signaled.contains(&descendants[0]));

    handle.wait().unwrap();
    assert_eq!(handle.exit_status(), Some(proctree::ExitStatus::Signaled(9)));
}

#[test]
fn test_still_alive_filters_exited_processes() {
    let controller = ProcessTreeController::new();
    let mut sleeper = ProcessHandle::with_config(ProcessConfig::new("sleep").arg("30"));
    let live = sleeper.start_async().unwrap();
    let mut finished = spawn_sh("exit 0");
    let gone = finished.pid().unwrap();
    finished.wait().unwrap();

    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(controller.still_alive(&[live, gone]), vec![live]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_unknown_root_fails_without_signaling() {
    // above the kernel's pid_max, so never a live process
    let missing = 1 << 23;
    let controller = ProcessTreeController::new();

    assert!(controller.terminate_tree(missing).is_err());
    assert!(controller.kill_tree(missing).is_err());
}
