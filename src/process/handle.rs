//! Ownership of a single spawned child process
//!
//! A [`ProcessHandle`] moves through `Unstarted -> Started(pid) -> {Running, Exited}`
//! and never holds more than one OS process. Dropping a started handle that
//! was never reaped kills the whole tree and blocks until the root is reaped,
//! so no zombie or orphaned descendant outlives it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;

use super::config::ProcessConfig;
use super::status::ExitStatus;
use super::tree::{ProcessTreeController, TreeScope};
use crate::error::{Error, Result};
use crate::platform::Signal;

pub struct ProcessHandle {
    config: ProcessConfig,
    pid: Option<u32>,
    running: bool,
    /// Set once a blocking wait collected a terminal status
    waited: bool,
    /// Set once the OS released the pid, through either a wait or a poll
    reaped: bool,
    status: Option<ExitStatus>,
    started_at: Option<DateTime<Utc>>,
    tree: ProcessTreeController,
}

impl ProcessHandle {
    pub fn new(command: impl Into<String>) -> Self {
        Self::with_config(ProcessConfig::new(command))
    }

    pub fn with_config(config: ProcessConfig) -> Self {
        Self::with_controller(config, ProcessTreeController::new())
    }

    /// Handle whose tree operations go through `tree`
    pub fn with_controller(config: ProcessConfig, tree: ProcessTreeController) -> Self {
        Self {
            config,
            pid: None,
            running: false,
            waited: false,
            reaped: false,
            status: None,
            started_at: None,
            tree,
        }
    }

    /// Replace the configuration. Only valid before the process is started.
    pub fn configure(&mut self, config: ProcessConfig) -> Result<()> {
        self.ensure_unstarted()?;
        self.config = config;
        Ok(())
    }

    pub fn add_arg(&mut self, arg: impl Into<String>) -> Result<()> {
        self.ensure_unstarted()?;
        self.config.args.push(arg.into());
        Ok(())
    }

    pub fn add_env_var(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.ensure_unstarted()?;
        self.config.env.push((name.into(), value.into()));
        Ok(())
    }

    fn ensure_unstarted(&self) -> Result<()> {
        match self.pid {
            Some(_) => Err(Error::AlreadyStarted {
                command: self.config.command.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_started(&self) -> bool {
        self.pid.is_some()
    }

    /// True once a blocking [`wait`](Self::wait) has collected a terminal status
    pub fn has_waited(&self) -> bool {
        self.waited
    }

    /// Spawn the process and return as soon as it exists
    pub fn start_async(&mut self) -> Result<u32> {
        self.ensure_unstarted()?;

        let child = self.config.to_command().spawn().map_err(|e| {
            error!("Exec failed for command {}: {}", self.config.command, e);
            Error::SpawnFailed {
                command: self.config.command.clone(),
                reason: e.to_string(),
            }
        })?;

        // reaping happens through waitpid on the raw pid, not through `child`
        let pid = child.id();
        drop(child);

        self.pid = Some(pid);
        self.running = true;
        self.started_at = Some(Utc::now());
        debug!("Started process {}: {:?}", pid, self.config.argv());
        Ok(pid)
    }

    /// Spawn the process and block until it finishes
    pub fn start(&mut self) -> Result<()> {
        self.start_async()?;
        self.wait()
    }

    /// Block until the process exits, is killed or is stopped.
    ///
    /// Succeeds without doing anything if the process was never started or
    /// has already been reaped. There is no timeout.
    pub fn wait(&mut self) -> Result<()> {
        let Some(pid) = self.pid else {
            return Ok(());
        };
        if self.reaped {
            return Ok(());
        }

        let status = loop {
            match waitpid(Pid::from_raw(pid as i32), Some(WaitPidFlag::WUNTRACED)) {
                Ok(status) => break status,
                Err(Errno::EINTR) => continue,
                Err(errno) => {
                    error!("Could not wait on process {}: {}", pid, errno);
                    if errno == Errno::ECHILD {
                        // reaped elsewhere; the pid must not be signaled any more
                        self.running = false;
                        self.reaped = true;
                    }
                    return Err(Error::WaitFailed { pid, errno });
                }
            }
        };

        if let Some(status) = ExitStatus::from_wait_status(status) {
            self.record(status);
            self.waited = self.reaped;
        }
        Ok(())
    }

    /// Non-blocking status poll
    fn poll(&mut self) {
        let Some(pid) = self.pid else {
            return;
        };
        if self.reaped {
            return;
        }

        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED;
        match waitpid(Pid::from_raw(pid as i32), Some(flags)) {
            Ok(status) => {
                if let Some(status) = ExitStatus::from_wait_status(status) {
                    self.record(status);
                }
            }
            Err(Errno::ECHILD) => {
                // reaped elsewhere; the pid must not be signaled any more
                warn!("Process {} is no longer a child of this process", pid);
                self.running = false;
                self.reaped = true;
            }
            Err(errno) => {
                error!("Could not wait on process {}: {}", pid, errno);
            }
        }
    }

    fn record(&mut self, status: ExitStatus) {
        debug!("Process {} {}", self.pid.unwrap_or_default(), status);
        self.status = Some(status);
        self.running = false;
        self.reaped = status.is_terminal();
    }

    /// Poll the process without blocking. Two calls may disagree without an
    /// intervening [`wait`](Self::wait).
    pub fn is_running(&mut self) -> bool {
        self.poll();
        self.running
    }

    /// Poll, then return the integer status.
    ///
    /// Exit code, terminating signal and stop signal share this value, and it
    /// reads 0 until the process has produced a status. Check
    /// [`is_running`](Self::is_running) first, or use
    /// [`exit_status`](Self::exit_status) for the tagged form.
    pub fn get_exit_code(&mut self) -> i32 {
        self.poll();
        self.status.map(ExitStatus::code).unwrap_or(0)
    }

    /// Poll, then return the tagged status if one has been produced
    pub fn exit_status(&mut self) -> Option<ExitStatus> {
        self.poll();
        self.status
    }

    fn signal(&mut self, signal: Signal, scope: TreeScope) -> Result<Vec<u32>> {
        let pid = self.pid.ok_or(Error::NotStarted)?;
        if self.reaped {
            // the pid may already belong to another process
            return Ok(Vec::new());
        }
        self.tree.signal_scoped(pid, signal, scope)
    }

    /// SIGTERM to every descendant. The process itself is not signaled.
    pub fn terminate(&mut self) -> Result<Vec<u32>> {
        self.signal(Signal::Terminate, TreeScope::DescendantsOnly)
    }

    /// SIGKILL to every descendant. The process itself is not signaled.
    pub fn kill(&mut self) -> Result<Vec<u32>> {
        self.signal(Signal::Kill, TreeScope::DescendantsOnly)
    }

    /// SIGTERM to every descendant, then to the process itself
    pub fn terminate_all(&mut self) -> Result<Vec<u32>> {
        self.signal(Signal::Terminate, TreeScope::WholeTree)
    }

    /// SIGKILL to every descendant, then to the process itself
    pub fn kill_all(&mut self) -> Result<Vec<u32>> {
        self.signal(Signal::Kill, TreeScope::WholeTree)
    }

    /// Kill the whole tree and reap the process if that has not happened yet
    pub fn close(&mut self) -> Result<()> {
        if self.pid.is_none() || self.reaped {
            return Ok(());
        }
        if let Err(e) = self.kill_all() {
            warn!("{}", e);
        }
        self.wait()
    }

    /// SIGTERM the whole tree, give it `grace` to exit, then SIGKILL whatever
    /// is left and reap the process.
    pub async fn shutdown(
        &mut self,
        grace: Duration,
        poll_interval: Duration,
    ) -> Result<Option<ExitStatus>> {
        let pid = self.pid.ok_or(Error::NotStarted)?;
        if self.reaped {
            return Ok(self.status);
        }

        let targets = self.terminate_all()?;
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            self.poll();
            if self.reaped || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(poll_interval).await;
        }

        if !self.reaped {
            warn!(
                "Process {} still running after {:?}, sending SIGKILL",
                pid, grace
            );
            self.kill_all()?;
        }

        let descendants: Vec<u32> = targets.into_iter().filter(|&p| p != pid).collect();
        let survivors = self.tree.still_alive(&descendants);
        if !survivors.is_empty() {
            warn!("Killing {} descendants that ignored SIGTERM", survivors.len());
            self.tree.signals().signal_all(&survivors, Signal::Kill);
        }

        self.wait()?;
        Ok(self.status)
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to clean up process {:?}: {}", self.pid, e);
        }
    }
}
