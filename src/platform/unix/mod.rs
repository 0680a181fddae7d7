//! Unix-specific platform implementations

#[cfg(target_os = "macos")]
mod libproc;
#[cfg(target_os = "linux")]
mod procfs;
mod signals;

#[cfg(target_os = "macos")]
pub use libproc::LibprocInspector;
#[cfg(target_os = "linux")]
pub use procfs::ProcfsInspector;
pub use signals::UnixSignals;
