//! macOS process inspection through the libproc API

// libproc is only reachable through raw FFI calls
#![allow(unsafe_code)]

use std::ffi::{c_int, c_void, OsStr};
use std::io;
use std::mem::size_of;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use crate::platform::traits::{InspectError, ProcessInspector};

/// PROC_PIDPATHINFO_MAXSIZE (4 * MAXPATHLEN)
const PIDPATH_BUF_LEN: usize = 4 * 1024;

/// Extra slots so processes created between the sizing and filling calls still fit
const PID_SLACK: usize = 16;

pub struct LibprocInspector;

impl LibprocInspector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LibprocInspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a sizing call then a filling call of the `proc_list*pids` family.
/// Both calls return a pid count, or a negative value on failure.
fn list_pids<F>(mut call: F) -> io::Result<Vec<u32>>
where
    F: FnMut(*mut c_void, c_int) -> c_int,
{
    let needed = call(std::ptr::null_mut(), 0);
    if needed < 0 {
        return Err(io::Error::last_os_error());
    }
    if needed == 0 {
        return Ok(Vec::new());
    }

    let mut buf: Vec<libc::pid_t> = vec![0; needed as usize + PID_SLACK];
    let buf_bytes = (buf.len() * size_of::<libc::pid_t>()) as c_int;
    let filled = call(buf.as_mut_ptr() as *mut c_void, buf_bytes);
    if filled < 0 {
        return Err(io::Error::last_os_error());
    }

    buf.truncate((filled as usize).min(buf.len()));
    Ok(buf.into_iter().filter(|&p| p > 0).map(|p| p as u32).collect())
}

impl ProcessInspector for LibprocInspector {
    fn child_pids(&self, pid: u32) -> Result<Vec<u32>, InspectError> {
        list_pids(|buf, size| unsafe { libc::proc_listchildpids(pid as libc::pid_t, buf, size) })
            .map_err(|source| InspectError::ChildListing { pid, source })
    }

    fn executable_path(&self, pid: u32) -> Result<PathBuf, InspectError> {
        let mut buf = vec![0u8; PIDPATH_BUF_LEN];
        let len = unsafe {
            libc::proc_pidpath(
                pid as c_int,
                buf.as_mut_ptr() as *mut c_void,
                buf.len() as u32,
            )
        };
        if len <= 0 {
            return Err(InspectError::ExecutablePath {
                pid,
                source: io::Error::last_os_error(),
            });
        }

        buf.truncate(len as usize);
        Ok(PathBuf::from(OsStr::from_bytes(&buf)))
    }

    fn all_pids(&self) -> Result<Vec<u32>, InspectError> {
        list_pids(|buf, size| unsafe { libc::proc_listallpids(buf, size) })
            .map_err(|source| InspectError::ProcessListing { source })
    }
}
