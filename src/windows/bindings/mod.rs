//! Windows API bindings
//!
//! Low-level FFI wrappers over kernel32 and the ToolHelp32 snapshot API.

pub mod kernel32;
pub mod toolhelp;

pub use toolhelp::{ProcessEntry, ProcessSnapshot};
