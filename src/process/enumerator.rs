//! Process discovery
//!
//! On Linux every lookup walks the process filesystem; the `*_in` variants
//! take an explicit [`ProcFs`] so they can run against a fake root. On
//! Windows the same operations walk a ToolHelp32 snapshot.

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use crate::procfs::ProcFs;
use std::io;
use tracing::{debug, info};

/// Ids of all processes in `procfs`, ascending
pub fn list_pids_in(procfs: &ProcFs) -> MemoryResult<Vec<ProcessId>> {
    Ok(procfs.list_pids()?)
}

/// Base name of an invocation path: everything after the last `/`
pub fn executable_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// True for read failures that mean "skip this process"
fn is_unreadable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) || err.raw_os_error() == Some(3)
}

/// First pid in ascending order whose executable base name equals `name`
///
/// Processes that exit or become unreadable mid-scan are skipped. Kernel
/// threads, whose command line is empty, never match.
pub fn find_pid_by_name_in(procfs: &ProcFs, name: &str) -> MemoryResult<Option<ProcessId>> {
    for pid in procfs.list_pids()? {
        let path = match procfs.executable_path(pid) {
            Ok(Some(path)) => path,
            Ok(None) => continue,
            Err(err) if is_unreadable(&err) => {
                debug!(pid, error = %err, "skipping unreadable process");
                continue;
            }
            Err(err) => return Err(MemoryError::IoError(err)),
        };
        if executable_name(&path) == name {
            debug!(pid, name, "found process by name");
            return Ok(Some(pid));
        }
    }
    info!(name, "no process found with that name");
    Ok(None)
}

/// Executable path of `pid` as invoked, `None` if unreadable or empty
pub fn process_path_in(procfs: &ProcFs, pid: ProcessId) -> Option<String> {
    match procfs.executable_path(pid) {
        Ok(path) => path,
        Err(err) => {
            debug!(pid, error = %err, "cannot read command line");
            None
        }
    }
}

/// Ids of all live processes, ascending
#[cfg(not(windows))]
pub fn list_available_pids() -> MemoryResult<Vec<ProcessId>> {
    list_pids_in(&ProcFs::default())
}

/// First live process whose executable base name equals `name`
#[cfg(not(windows))]
pub fn get_pid_by_name(name: &str) -> MemoryResult<Option<ProcessId>> {
    find_pid_by_name_in(&ProcFs::default(), name)
}

/// Executable path of a live process
#[cfg(not(windows))]
pub fn get_process_path(pid: ProcessId) -> MemoryResult<String> {
    match ProcFs::default().executable_path(pid) {
        Ok(path) => Ok(path.unwrap_or_default()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(MemoryError::ProcessNotFound(format!("PID: {}", pid)))
        }
        Err(err) => Err(MemoryError::IoError(err)),
    }
}

#[cfg(windows)]
pub fn list_available_pids() -> MemoryResult<Vec<ProcessId>> {
    let mut pids: Vec<ProcessId> = crate::windows::process_entries()?
        .into_iter()
        .map(|entry| entry.pid)
        .filter(|&pid| pid != 0)
        .collect();
    pids.sort_unstable();
    pids.dedup();
    Ok(pids)
}

/// Image names compare case-insensitively, as the file system does
#[cfg(windows)]
pub fn get_pid_by_name(name: &str) -> MemoryResult<Option<ProcessId>> {
    let mut entries = crate::windows::process_entries()?;
    entries.sort_unstable_by_key(|entry| entry.pid);
    let found = entries
        .into_iter()
        .find(|entry| entry.pid != 0 && entry.exe_name.eq_ignore_ascii_case(name))
        .map(|entry| entry.pid);
    if found.is_none() {
        info!(name, "no process found with that name");
    }
    Ok(found)
}

#[cfg(windows)]
pub fn get_process_path(pid: ProcessId) -> MemoryResult<String> {
    crate::windows::process_image_path(pid).map_err(|err| match err.raw_os_error() {
        Some(87) => MemoryError::ProcessNotFound(format!("PID: {}", pid)),
        _ => MemoryError::IoError(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn add_process(root: &TempDir, pid: u32, cmdline: &[u8]) {
        let dir = root.path().join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("cmdline"), cmdline).unwrap();
    }

    #[test]
    fn test_executable_name() {
        assert_eq!(executable_name("/usr/bin/game"), "game");
        assert_eq!(executable_name("game"), "game");
        assert_eq!(executable_name("./bin/game"), "game");
        assert_eq!(executable_name("/usr/bin/"), "");
    }

    #[test]
    fn test_find_by_name_returns_lowest_match() {
        let root = TempDir::new().unwrap();
        add_process(&root, 300, b"/opt/game\0");
        add_process(&root, 20, b"/usr/bin/game\0-x\0");
        add_process(&root, 7, b"/usr/bin/other\0");
        fs::create_dir(root.path().join("self")).unwrap();

        let procfs = ProcFs::new(root.path());
        assert_eq!(find_pid_by_name_in(&procfs, "game").unwrap(), Some(20));
        assert_eq!(find_pid_by_name_in(&procfs, "other").unwrap(), Some(7));
        assert_eq!(find_pid_by_name_in(&procfs, "missing").unwrap(), None);
    }

    #[test]
    fn test_find_by_name_skips_kernel_threads_and_vanished() {
        let root = TempDir::new().unwrap();
        add_process(&root, 2, b"");
        // directory without a cmdline file: exited between listing and reading
        fs::create_dir(root.path().join("5")).unwrap();
        add_process(&root, 9, b"/bin/sh\0");

        let procfs = ProcFs::new(root.path());
        assert_eq!(find_pid_by_name_in(&procfs, "sh").unwrap(), Some(9));
        assert_eq!(find_pid_by_name_in(&procfs, "").unwrap(), None);
    }

    #[test]
    fn test_name_match_is_exact() {
        let root = TempDir::new().unwrap();
        add_process(&root, 11, b"/usr/bin/gamer\0");
        let procfs = ProcFs::new(root.path());
        assert_eq!(find_pid_by_name_in(&procfs, "game").unwrap(), None);
        assert_eq!(find_pid_by_name_in(&procfs, "Gamer").unwrap(), None);
    }

    #[test]
    fn test_list_pids_in_fake_root() {
        let root = TempDir::new().unwrap();
        for pid in [42, 1, 1000] {
            add_process(&root, pid, b"x\0");
        }
        fs::create_dir(root.path().join("sys")).unwrap();
        let procfs = ProcFs::new(root.path());
        assert_eq!(list_pids_in(&procfs).unwrap(), vec![1, 42, 1000]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let procfs = ProcFs::new("/nonexistent/proc/root");
        assert!(list_pids_in(&procfs).is_err());
        assert!(find_pid_by_name_in(&procfs, "x").is_err());
    }

    #[test]
    fn test_process_path_in() {
        let root = TempDir::new().unwrap();
        add_process(&root, 3, b"/usr/bin/game\0--flag\0");
        let procfs = ProcFs::new(root.path());
        assert_eq!(process_path_in(&procfs, 3).as_deref(), Some("/usr/bin/game"));
        assert_eq!(process_path_in(&procfs, 4), None);
    }

    #[test]
    #[cfg(target_os = "linux")]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_live_discovery_finds_self() {
        let me = std::process::id();
        assert!(list_available_pids().unwrap().contains(&me));

        let path = get_process_path(me).unwrap();
        let name = executable_name(&path).to_string();
        let found = get_pid_by_name(&name).unwrap();
        assert!(found.is_some());
    }
}
