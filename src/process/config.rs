//! Spawn configuration for a not-yet-started process

use std::process::{Command, Stdio};

use crate::config::ProcessDefaults;

/// Command, arguments, environment overrides and stdio policy of a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Program to run; resolved through `PATH` when it has no slash
    pub command: String,
    /// Arguments passed after the command
    pub args: Vec<String>,
    /// Environment overrides applied on top of the inherited environment.
    /// A later entry for the same name replaces an earlier one.
    pub env: Vec<(String, String)>,
    /// When false, stdout and stderr go to the null device
    pub capture_stdout: bool,
    /// When false, stdin reads from the null device
    pub allow_stdin: bool,
}

impl ProcessConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            capture_stdout: true,
            allow_stdin: true,
        }
    }

    /// New configuration using the configured stdio policy
    pub fn from_defaults(command: impl Into<String>, defaults: &ProcessDefaults) -> Self {
        Self {
            capture_stdout: defaults.capture_stdout,
            allow_stdin: defaults.allow_stdin,
            ..Self::new(command)
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((name.into(), value.into()));
        self
    }

    pub fn capture_stdout(mut self, capture: bool) -> Self {
        self.capture_stdout = capture;
        self
    }

    pub fn allow_stdin(mut self, allow: bool) -> Self {
        self.allow_stdin = allow;
        self
    }

    /// Argument vector as the child sees it: the command followed by its args
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Overrides with duplicates collapsed to the last value, in first-seen order
    pub fn effective_env(&self) -> Vec<(&str, &str)> {
        let mut effective: Vec<(&str, &str)> = Vec::with_capacity(self.env.len());
        for (name, value) in &self.env {
            match effective.iter_mut().find(|(n, _)| *n == name.as_str()) {
                Some(slot) => slot.1 = value.as_str(),
                None => effective.push((name.as_str(), value.as_str())),
            }
        }
        effective
    }

    /// Build the standard library command for this configuration
    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.command);
        command.args(&self.args);
        command.envs(self.effective_env());

        if !self.capture_stdout {
            command.stdout(Stdio::null());
            command.stderr(Stdio::null());
        }
        if !self.allow_stdin {
            command.stdin(Stdio::null());
        }

        command
    }
}
