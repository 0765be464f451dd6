//! Layout of the process pseudo-filesystem
//!
//! Every path under `/proc` the crate touches is built here, so tests can
//! point a [`ProcFs`] at a temporary directory shaped like the real thing.

use crate::core::types::ProcessId;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Default mount point of the process filesystem
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Handle on a process filesystem root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    /// Creates a view rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        ProcFs {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pid_dir(&self, pid: ProcessId) -> PathBuf {
        self.root.join(pid.to_string())
    }

    pub fn maps_path(&self, pid: ProcessId) -> PathBuf {
        self.pid_dir(pid).join("maps")
    }

    pub fn mem_path(&self, pid: ProcessId) -> PathBuf {
        self.pid_dir(pid).join("mem")
    }

    pub fn cmdline_path(&self, pid: ProcessId) -> PathBuf {
        self.pid_dir(pid).join("cmdline")
    }

    /// Numeric entries of the root directory, ascending
    ///
    /// Entries whose names are not purely decimal digits (`self`, `sys`,
    /// `net`, ...) are not processes and are skipped.
    pub fn list_pids(&self) -> io::Result<Vec<ProcessId>> {
        let mut pids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(pid) = entry.file_name().to_str().and_then(parse_pid) {
                pids.push(pid);
            }
        }
        pids.sort_unstable();
        Ok(pids)
    }

    /// Executable path as invoked: the first NUL-separated token of `cmdline`
    ///
    /// Kernel threads have an empty command line and yield `Ok(None)`.
    pub fn executable_path(&self, pid: ProcessId) -> io::Result<Option<String>> {
        let raw = fs::read(self.cmdline_path(pid))?;
        let first = raw.split(|&b| b == 0).next().unwrap_or_default();
        if first.is_empty() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(first).into_owned()))
    }

    /// Opens the mapping table for line-by-line reading
    pub fn open_maps(&self, pid: ProcessId) -> io::Result<BufReader<File>> {
        File::open(self.maps_path(pid)).map(BufReader::new)
    }

    /// Opens the memory pseudo-file; a fresh descriptor on every call
    pub fn open_mem(&self, pid: ProcessId, writable: bool) -> io::Result<File> {
        OpenOptions::new()
            .read(!writable)
            .write(writable)
            .open(self.mem_path(pid))
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        ProcFs::new(DEFAULT_PROC_ROOT)
    }
}

/// Parses a directory name that consists only of decimal digits
pub fn parse_pid(name: &str) -> Option<ProcessId> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}
