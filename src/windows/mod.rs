//! Windows API layer
//!
//! All unsafe FFI calls are contained within this module. Wrappers return
//! `io::Error`s carrying the `GetLastError` code.

pub mod bindings;
pub mod regions;
pub mod types;

pub use bindings::{kernel32, ProcessEntry, ProcessSnapshot};
pub use types::Handle;

use crate::core::types::ProcessId;
use std::io;

/// Image base names and ids of every running process
pub fn process_entries() -> io::Result<Vec<ProcessEntry>> {
    Ok(ProcessSnapshot::new()?.collect())
}

/// Full image path of `pid`
pub fn process_image_path(pid: ProcessId) -> io::Result<String> {
    let handle = kernel32::open_process(pid, kernel32::QUERY_ACCESS)?;
    kernel32::query_full_process_image_name(&handle)
}
