//! Process lifecycle and process-tree control
//!
//! This module spawns external commands, tracks and reaps them, and delivers
//! signals across the process trees they create.

pub mod config;
pub mod finder;
pub mod handle;
pub mod status;
pub mod tree;

// Re-exports for convenience
pub use config::ProcessConfig;
pub use finder::{matches_executable, ProcessFinder};
pub use handle::ProcessHandle;
pub use status::ExitStatus;
pub use tree::{ProcessTreeController, TreeScope};
