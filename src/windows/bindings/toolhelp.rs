//! ToolHelp32 process snapshot

use crate::windows::types::Handle;
use std::ffi::OsString;
use std::io;
use std::mem;
use std::os::windows::ffi::OsStringExt;
use winapi::shared::minwindef::FALSE;
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};

/// One row of the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Image base name, e.g. `notepad.exe`
    pub exe_name: String,
}

/// Iterator over every process alive when the snapshot was taken
pub struct ProcessSnapshot {
    snapshot: Handle,
    first_called: bool,
}

impl ProcessSnapshot {
    pub fn new() -> io::Result<Self> {
        let raw = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
        if raw.is_null() || raw == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(ProcessSnapshot {
            snapshot: Handle::new(raw),
            first_called: false,
        })
    }
}

impl Iterator for ProcessSnapshot {
    type Item = ProcessEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let mut entry: PROCESSENTRY32W = unsafe { mem::zeroed() };
        entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;

        let success = unsafe {
            if self.first_called {
                Process32NextW(self.snapshot.raw(), &mut entry)
            } else {
                self.first_called = true;
                Process32FirstW(self.snapshot.raw(), &mut entry)
            }
        };
        if success == FALSE {
            return None;
        }

        let name = &entry.szExeFile;
        let len = name.iter().position(|&c| c == 0).unwrap_or(name.len());
        Some(ProcessEntry {
            pid: entry.th32ProcessID,
            exe_name: OsString::from_wide(&name[..len])
                .to_string_lossy()
                .into_owned(),
        })
    }
}
