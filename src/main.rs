//! proctree - operator tool for process trees
//!
//! Runs commands under a [`ProcessHandle`], lists descendants, and finds or
//! stops processes by executable.

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use tracing::{debug, info, warn};

use proctree::{
    Config, ExitStatus, ProcessConfig, ProcessFinder, ProcessHandle, ProcessTreeController,
    Signal, TreeScope,
};

/// Subcommand to execute
#[derive(Debug, PartialEq)]
enum Command {
    /// Spawn a command and wait for it, optionally with a deadline
    Run {
        command: String,
        args: Vec<String>,
        env: Vec<(String, String)>,
        quiet: bool,
        no_stdin: bool,
        timeout_ms: Option<u64>,
    },
    /// Print the descendants of a pid, deepest first
    Descendants { pid: u32, best_effort: bool },
    /// Print pids running an executable
    Find { target: String },
    /// SIGTERM every process running an executable
    Stop { target: String },
    /// Signal the tree under a pid
    KillTree {
        pid: u32,
        force: bool,
        include_root: bool,
    },
}

/// Application configuration
#[derive(Debug)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug mode
    debug: bool,
    /// What to do
    command: Command,
}

fn parse_pid(text: &str) -> anyhow::Result<u32> {
    text.parse::<u32>()
        .with_context(|| format!("Invalid pid: '{}'", text))
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> anyhow::Result<Self> {
        Self::parse_from(env::args().skip(1).collect())
    }

    fn parse_from(args: Vec<String>) -> anyhow::Result<Self> {
        let mut config_path = None;
        let mut debug = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    let path = args.get(i + 1).ok_or_else(|| anyhow!("Missing config file path"))?;
                    config_path = Some(PathBuf::from(path));
                    i += 1;
                }
                "--debug" | "-d" => {
                    debug = true;
                }
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("proctree v{}", proctree::VERSION);
                    process::exit(0);
                }
                arg if arg.starts_with('-') => {
                    bail!("Unknown option: {}", arg);
                }
                _ => break,
            }
            i += 1;
        }

        let Some(name) = args.get(i) else {
            bail!("Missing command");
        };
        let rest = &args[i + 1..];
        let command = match name.as_str() {
            "run" => Self::parse_run(rest)?,
            "descendants" => {
                let mut pid = None;
                let mut best_effort = false;
                for arg in rest {
                    match arg.as_str() {
                        "--best-effort" => best_effort = true,
                        other => pid = Some(parse_pid(other)?),
                    }
                }
                Command::Descendants {
                    pid: pid.ok_or_else(|| anyhow!("Missing pid"))?,
                    best_effort,
                }
            }
            "find" | "stop" => {
                let target = rest
                    .first()
                    .cloned()
                    .ok_or_else(|| anyhow!("Missing executable name or path"))?;
                if name == "find" {
                    Command::Find { target }
                } else {
                    Command::Stop { target }
                }
            }
            "kill-tree" => {
                let mut pid = None;
                let mut force = false;
                let mut include_root = false;
                for arg in rest {
                    match arg.as_str() {
                        "--force" => force = true,
                        "--include-root" => include_root = true,
                        other => pid = Some(parse_pid(other)?),
                    }
                }
                Command::KillTree {
                    pid: pid.ok_or_else(|| anyhow!("Missing pid"))?,
                    force,
                    include_root,
                }
            }
            other => bail!("Unknown command: {}", other),
        };

        Ok(Self {
            config_path,
            debug,
            command,
        })
    }

    fn parse_run(args: &[String]) -> anyhow::Result<Command> {
        let mut env_vars = Vec::new();
        let mut quiet = false;
        let mut no_stdin = false;
        let mut timeout_ms = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--quiet" | "-q" => quiet = true,
                "--no-stdin" => no_stdin = true,
                "--env" | "-e" => {
                    let pair = args.get(i + 1).ok_or_else(|| anyhow!("Missing NAME=VALUE"))?;
                    let (name, value) = pair
                        .split_once('=')
                        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got '{}'", pair))?;
                    env_vars.push((name.to_string(), value.to_string()));
                    i += 1;
                }
                "--timeout" | "-t" => {
                    let ms = args.get(i + 1).ok_or_else(|| anyhow!("Missing timeout"))?;
                    timeout_ms = Some(
                        ms.parse::<u64>()
                            .with_context(|| format!("Invalid timeout: '{}'", ms))?,
                    );
                    i += 1;
                }
                "--" => {
                    i += 1;
                    break;
                }
                arg if arg.starts_with('-') => bail!("Unknown run option: {}", arg),
                _ => break,
            }
            i += 1;
        }

        let command = args.get(i).cloned().ok_or_else(|| anyhow!("Missing command to run"))?;
        Ok(Command::Run {
            command,
            args: args[i + 1..].to_vec(),
            env: env_vars,
            quiet,
            no_stdin,
            timeout_ms,
        })
    }
}

/// Print help information
fn print_help() {
    println!("proctree - spawn, inspect and stop process trees");
    println!();
    println!("USAGE:");
    println!("    proctree [OPTIONS] <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    run [-q] [--no-stdin] [-e NAME=VALUE]... [-t MS] [--] <CMD> [ARGS]...");
    println!("                                 Run a command and wait for it");
    println!("    descendants <PID> [--best-effort]");
    println!("                                 List descendants, deepest first");
    println!("    find <NAME|PATH>               List pids running an executable");
    println!("    stop <NAME|PATH>               Send SIGTERM to matching processes");
    println!("    kill-tree <PID> [--force] [--include-root]");
    println!("                                 Signal every descendant of PID");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    -d, --debug            Enable debug logging");
    println!("    -h, --help             Print this help message");
    println!("    -V, --version          Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    PROCTREE_CONFIG        Path to configuration file");
    println!("    PROCTREE_DEBUG         Enable debug logging (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

/// Shell-style exit code for a finished child
fn shell_exit_code(status: Option<ExitStatus>) -> i32 {
    match status {
        Some(ExitStatus::Exited(code)) => code,
        Some(ExitStatus::Signaled(signal)) | Some(ExitStatus::Stopped(signal)) => 128 + signal,
        None => 1,
    }
}

async fn run(
    config: &Config,
    command: String,
    args: Vec<String>,
    env_vars: Vec<(String, String)>,
    quiet: bool,
    no_stdin: bool,
    timeout_ms: Option<u64>,
) -> anyhow::Result<i32> {
    let mut process_config = ProcessConfig::from_defaults(command, &config.process).args(args);
    for (name, value) in env_vars {
        process_config = process_config.env(name, value);
    }
    if quiet {
        process_config = process_config.capture_stdout(false);
    }
    if no_stdin {
        process_config = process_config.allow_stdin(false);
    }

    let mut handle = ProcessHandle::with_config(process_config);
    let pid = handle.start_async()?;
    info!("Started process {}", pid);

    match timeout_ms {
        None => handle.wait()?,
        Some(ms) => {
            let deadline = tokio::time::Instant::now() + Duration::from_millis(ms);
            let poll_interval = config.shutdown.poll_interval();
            while handle.is_running() && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(poll_interval).await;
            }
            if handle.is_running() {
                warn!("Process {} exceeded {} ms, shutting down", pid, ms);
                handle
                    .shutdown(config.shutdown.grace_period(), poll_interval)
                    .await?;
            } else {
                handle.wait()?;
            }
        }
    }

    let status = handle.exit_status();
    match status {
        Some(status) => info!("Process {} {}", pid, status),
        None => warn!("Process {} produced no status", pid),
    }
    Ok(shell_exit_code(status))
}

async fn execute(config: &Config, command: Command) -> anyhow::Result<i32> {
    match command {
        Command::Run {
            command,
            args,
            env,
            quiet,
            no_stdin,
            timeout_ms,
        } => run(config, command, args, env, quiet, no_stdin, timeout_ms).await,
        Command::Descendants { pid, best_effort } => {
            let inspector = proctree::Platform::inspector();
            let pids = if best_effort {
                let scan = inspector.descendants_best_effort(pid);
                if !scan.complete {
                    warn!("Some subtrees of {} could not be listed", pid);
                }
                scan.pids
            } else {
                inspector.descendants_of(pid)?
            };
            for pid in pids {
                println!("{}", pid);
            }
            Ok(0)
        }
        Command::Find { target } => {
            let pids = ProcessFinder::new().find(&target)?;
            for pid in &pids {
                println!("{}", pid);
            }
            Ok(if pids.is_empty() { 1 } else { 0 })
        }
        Command::Stop { target } => {
            let pids = ProcessFinder::new().stop_tool(&target)?;
            Ok(if pids.is_empty() { 1 } else { 0 })
        }
        Command::KillTree {
            pid,
            force,
            include_root,
        } => {
            let signal = if force { Signal::Kill } else { Signal::Terminate };
            let scope = if include_root {
                TreeScope::WholeTree
            } else {
                TreeScope::DescendantsOnly
            };
            let targets = ProcessTreeController::new().signal_scoped(pid, signal, scope)?;
            info!("Sent {} to {} processes", signal, targets.len());
            Ok(0)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments first
    let args = match AppArgs::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Failed to parse arguments: {:#}", e);
            print_help();
            process::exit(2);
        }
    };

    let debug = args.debug
        || env::var("PROCTREE_DEBUG").map_or(false, |v| v == "1" || v.to_lowercase() == "true");
    let config_path = args
        .config_path
        .clone()
        .or_else(|| env::var("PROCTREE_CONFIG").ok().map(PathBuf::from));

    let config = proctree::init(config_path.as_deref(), debug);
    debug!("Running {:?}", args.command);

    let code = execute(&config, args.command).await?;

    process::exit(code);
}
