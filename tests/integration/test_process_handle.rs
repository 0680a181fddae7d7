//! Integration Tests for ProcessHandle
//!
//! Spawns real commands and checks spawn, wait, polling, exit status and
//! cleanup behavior.

#[path = "../common/mod.rs"]
mod common;

use common::{is_defunct, spawn_sh, wait_for, wait_for_descendants, DEADLINE};
use proctree::{Error, ExitStatus, ProcessConfig, ProcessHandle};

#[test]
fn test_exit_code_is_reported_after_wait() {
    for code in [0, 1, 42, 255] {
        let mut handle = spawn_sh(&format!("exit {}", code));
        handle.wait().unwrap();

        assert!(handle.has_waited());
        assert_eq!(handle.get_exit_code(), code);
        assert!(!handle.is_running());
        assert_eq!(handle.exit_status(), Some(ExitStatus::Exited(code)));
    }
}

#[test]
fn test_start_blocks_until_exit() {
    let mut handle = ProcessHandle::with_config(ProcessConfig::new("sh").args(["-c", "exit 7"]));
    handle.start().unwrap();

    assert!(!handle.is_running());
    assert_eq!(handle.get_exit_code(), 7);
}

#[test]
fn test_exit_code_collides_with_signal_number() {
    let mut exited = spawn_sh("exit 15");
    exited.wait().unwrap();

    let mut signaled = ProcessHandle::with_config(ProcessConfig::new("sleep").arg("30"));
    signaled.start_async().unwrap();
    signaled.terminate_all().unwrap();
    signaled.wait().unwrap();

    // the integer view cannot tell them apart
    assert_eq!(exited.get_exit_code(), 15);
    assert_eq!(signaled.get_exit_code(), 15);

    // the tagged view can
    assert_eq!(exited.exit_status(), Some(ExitStatus::Exited(15)));
    assert_eq!(signaled.exit_status(), Some(ExitStatus::Signaled(15)));
}

#[test]
fn test_running_then_exited_without_wait() {
    let mut handle = ProcessHandle::with_config(ProcessConfig::new("sleep").arg("1"));
    handle.start_async().unwrap();

    assert!(handle.is_running());
    assert_eq!(handle.get_exit_code(), 0, "placeholder while running");
    assert_eq!(handle.exit_status(), None);

    let exited = wait_for(DEADLINE, || (!handle.is_running()).then_some(()));
    assert!(exited.is_some(), "sleep 1 never finished");
    assert_eq!(handle.exit_status(), Some(ExitStatus::Exited(0)));
    assert!(!handle.has_waited());
}

#[test]
fn test_status_is_stable_after_wait() {
    let mut handle = spawn_sh("exit 3");
    handle.wait().unwrap();

    for _ in 0..5 {
        assert!(!handle.is_running());
        assert_eq!(handle.get_exit_code(), 3);
    }
    assert!(handle.wait().is_ok(), "second wait is a no-op");
    assert_eq!(handle.get_exit_code(), 3);
}

#[test]
fn test_wait_without_start_is_noop() {
    let mut handle = ProcessHandle::new("sleep");
    assert!(handle.wait().is_ok());
    assert!(!handle.has_waited());
}

#[test]
fn test_env_overrides_take_precedence() {
    let config = ProcessConfig::new("sh")
        .args(["-c", r#"test "$HOME" = /proctree-home && test "$PROCTREE_MODE" = second"#])
        .env("HOME", "/proctree-home")
        .env("PROCTREE_MODE", "first")
        .env("PROCTREE_MODE", "second");
    let mut handle = ProcessHandle::with_config(config);
    handle.start().unwrap();

    assert_eq!(handle.exit_status(), Some(ExitStatus::Exited(0)));
}

#[test]
fn test_null_stdin_reads_eof() {
    let config = ProcessConfig::new("sh")
        .args(["-c", "read line; test $? -ne 0"])
        .allow_stdin(false)
        .capture_stdout(false);
    let mut handle = ProcessHandle::with_config(config);
    handle.start().unwrap();

    assert_eq!(handle.get_exit_code(), 0);
}

#[test]
fn test_spawn_failure_is_reported() {
    let mut handle = ProcessHandle::new("proctree-no-such-command-xyz");
    let result = handle.start_async();

    assert!(matches!(result, Err(Error::SpawnFailed { .. })));
    assert!(!handle.is_started());
    assert!(!handle.is_running());
}

#[test]
fn test_drop_kills_and_reaps() {
    let mut handle = ProcessHandle::with_config(ProcessConfig::new("sleep").arg("30"));
    let pid = handle.start_async().unwrap();
    drop(handle);

    // reaped, so not even a zombie is left behind
    assert!(!proctree::Platform::signals().is_alive(pid));
}

#[test]
fn test_stopped_process_is_reported_then_reaped_on_drop() {
    use nix::sys::signal::{kill, Signal as NixSignal};
    use nix::unistd::Pid;

    let mut handle = ProcessHandle::with_config(ProcessConfig::new("sleep").arg("30"));
    let pid = handle.start_async().unwrap();
    kill(Pid::from_raw(pid as i32), NixSignal::SIGSTOP).unwrap();

    handle.wait().unwrap();
    let stop = NixSignal::SIGSTOP as i32;
    assert_eq!(handle.exit_status(), Some(ExitStatus::Stopped(stop)));
    assert_eq!(handle.get_exit_code(), stop);
    assert!(!handle.is_running());
    assert!(!handle.has_waited(), "a stop is not a terminal status");

    drop(handle);
    assert!(!proctree::Platform::signals().is_alive(pid));
}

#[test]
fn test_drop_kills_descendants() {
    let handle = spawn_sh("sleep 30 & sleep 30 & wait");
    let root = handle.pid().unwrap();
    let descendants = wait_for_descendants(root, 2);
    drop(handle);

    for pid in descendants {
        let gone = wait_for(DEADLINE, || is_defunct(pid).then_some(()));
        assert!(gone.is_some(), "descendant {} survived drop", pid);
    }
}

#[test]
fn test_close_is_explicit_cleanup() {
    let mut handle = ProcessHandle::with_config(ProcessConfig::new("sleep").arg("30"));
    handle.start_async().unwrap();
    handle.close().unwrap();

    assert!(!handle.is_running());
    assert_eq!(handle.exit_status(), Some(ExitStatus::Signaled(9)));
    // nothing left to clean up
    assert!(handle.close().is_ok());
}

#[test]
fn test_signals_after_reap_are_noops() {
    let mut handle = spawn_sh("exit 0");
    handle.wait().unwrap();

    assert!(handle.terminate().unwrap().is_empty());
    assert!(handle.kill_all().unwrap().is_empty());
}

#[test]
fn test_started_at_is_recorded() {
    let before = chrono::Utc::now();
    let mut handle = spawn_sh("exit 0");
    handle.wait().unwrap();

    let started = handle.started_at().unwrap();
    assert!(started >= before - chrono::Duration::seconds(1));
    assert!(started <= chrono::Utc::now());
}
