//! Unit tests for tree signaling and process search over an in-memory
//! process table

use std::sync::{Arc, Mutex};

use proctree::platform::synthetic::SyntheticInspector;
use proctree::{
    ProcessFinder, ProcessInspector, ProcessTreeController, Signal, SignalDispatcher, TreeScope,
};

/// Records every delivery; pids listed in `refuse` fail with EPERM-like errors
#[derive(Clone, Default)]
struct Recorder {
    sent: Arc<Mutex<Vec<(u32, Signal)>>>,
    refuse: Vec<u32>,
}

impl Recorder {
    fn refusing(pids: &[u32]) -> Self {
        Self {
            refuse: pids.to_vec(),
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<(u32, Signal)> {
        self.sent.lock().unwrap().clone()
    }
}

impl SignalDispatcher for Recorder {
    fn send(&self, pid: u32, signal: Signal) -> proctree::Result<()> {
        self.sent.lock().unwrap().push((pid, signal));
        if self.refuse.contains(&pid) {
            return Err(proctree::Error::SignalSendFailed {
                pid,
                signal: signal.to_string(),
                reason: "Operation not permitted".to_string(),
            });
        }
        Ok(())
    }

    fn is_alive(&self, pid: u32) -> bool {
        !self.sent().iter().any(|&(p, s)| p == pid && s == Signal::Kill)
    }
}

/// 1 ── 2 ── 3
///  │    └── 4
///  └── 5 ── 6
fn sample_tree() -> SyntheticInspector {
    SyntheticInspector::new()
        .with_child(1, 2)
        .with_child(2, 3)
        .with_child(2, 4)
        .with_child(1, 5)
        .with_child(5, 6)
}

fn controller(inspector: SyntheticInspector, recorder: &Recorder) -> ProcessTreeController {
    ProcessTreeController::with_ops(Box::new(inspector), Box::new(recorder.clone()))
}

#[test]
fn test_terminate_tree_signals_descendants_deepest_first() {
    let recorder = Recorder::default();
    let tree = controller(sample_tree(), &recorder);

    let targeted = tree.terminate_tree(1).unwrap();

    assert_eq!(targeted, vec![3, 4, 2, 6, 5]);
    let sent: Vec<(u32, Signal)> = targeted.iter().map(|&p| (p, Signal::Terminate)).collect();
    assert_eq!(recorder.sent(), sent);
}

#[test]
fn test_kill_tree_of_subtree() {
    let recorder = Recorder::default();
    let tree = controller(sample_tree(), &recorder);

    assert_eq!(tree.kill_tree(2).unwrap(), vec![3, 4]);
    assert!(recorder.sent().iter().all(|&(_, s)| s == Signal::Kill));
}

#[test]
fn test_leaf_root_sends_nothing() {
    let recorder = Recorder::default();
    let tree = controller(sample_tree(), &recorder);

    assert!(tree.terminate_tree(6).unwrap().is_empty());
    assert!(recorder.sent().is_empty());
}

#[test]
fn test_delivery_failures_do_not_stop_the_sweep() {
    let recorder = Recorder::refusing(&[3, 2]);
    let tree = controller(sample_tree(), &recorder);

    let targeted = tree.kill_tree(1).unwrap();

    assert_eq!(targeted.len(), 5);
    assert_eq!(recorder.sent().len(), 5);
}

#[test]
fn test_enumeration_failure_sends_nothing() {
    let recorder = Recorder::default();
    let tree = controller(sample_tree().with_failing_listing(5), &recorder);

    assert!(tree.terminate_tree(1).is_err());
    assert!(recorder.sent().is_empty());
}

#[test]
fn test_whole_tree_ends_with_root() {
    let recorder = Recorder::default();
    let tree = controller(sample_tree(), &recorder);

    let targeted = tree
        .signal_scoped(1, Signal::Kill, TreeScope::WholeTree)
        .unwrap();

    assert_eq!(targeted, vec![3, 4, 2, 6, 5, 1]);
}

#[test]
fn test_whole_tree_survives_partial_enumeration() {
    let recorder = Recorder::default();
    let tree = controller(sample_tree().with_failing_listing(5), &recorder);

    let targeted = tree.signal_whole_tree(1, Signal::Kill);

    // the subtree under 5 is unreadable, but 5 itself and the root still go
    assert_eq!(targeted, vec![3, 4, 2, 5, 1]);
}

#[test]
fn test_still_alive_after_kill() {
    let recorder = Recorder::default();
    let tree = controller(sample_tree(), &recorder);

    tree.kill_tree(2).unwrap();
    assert_eq!(tree.still_alive(&[2, 3, 4]), vec![2]);
}

#[test]
fn test_best_effort_scan_reports_gaps() {
    let inspector = sample_tree().with_failing_listing(2);

    let scan = inspector.descendants_best_effort(1);
    assert!(!scan.complete);
    assert_eq!(scan.pids, vec![2, 6, 5]);

    let full = sample_tree().descendants_best_effort(1);
    assert!(full.complete);
    assert_eq!(full.pids, sample_tree().descendants_of(1).unwrap());
}

fn tool_table() -> SyntheticInspector {
    SyntheticInspector::new()
        .with_process(10, "/usr/bin/node")
        .with_process(11, "/opt/node/bin/node")
        .with_process(12, "/usr/bin/python3")
        .with_process(13, "/usr/bin/nodemon")
        .with_child(12, 14)
}

#[test]
fn test_find_by_basename_matches_every_directory() {
    let finder = ProcessFinder::with_ops(Box::new(tool_table()), Box::new(Recorder::default()));

    assert_eq!(finder.find("node").unwrap(), vec![10, 11]);
    assert!(finder.find("nod").unwrap().is_empty());
}

#[test]
fn test_find_by_absolute_path_is_exact() {
    let finder = ProcessFinder::with_ops(Box::new(tool_table()), Box::new(Recorder::default()));

    assert_eq!(finder.find("/opt/node/bin/node").unwrap(), vec![11]);
    assert!(finder.find("/bin/node").unwrap().is_empty());
}

#[test]
fn test_stop_tool_sends_terminate_only() {
    let recorder = Recorder::refusing(&[10]);
    let finder = ProcessFinder::with_ops(Box::new(tool_table()), Box::new(recorder.clone()));

    let attempted = finder.stop_tool("node").unwrap();

    assert_eq!(attempted, vec![10, 11]);
    assert_eq!(
        recorder.sent(),
        vec![(10, Signal::Terminate), (11, Signal::Terminate)]
    );
}
