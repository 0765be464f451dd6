//! Custom error types for Memory-Edit

use super::{Address, ProcessId};
use crate::config::ConfigError;
use std::io;
use thiserror::Error;

/// OS error code reported when the target process no longer exists
#[cfg(not(windows))]
const PROCESS_GONE: i32 = 3; // ESRCH
#[cfg(windows)]
const PROCESS_GONE: i32 = 87; // ERROR_INVALID_PARAMETER from OpenProcess

/// Main error type for process memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Failed to attach to process {pid}: {operation} failed with OS error {code}: {message}")]
    AttachFailed {
        pid: ProcessId,
        operation: &'static str,
        code: i32,
        message: String,
    },

    #[error("Failed to detach from process {pid}: {operation} failed with OS error {code}: {message}")]
    DetachFailed {
        pid: ProcessId,
        operation: &'static str,
        code: i32,
        message: String,
    },

    #[error("Failed to read {length} bytes at {address}: {reason}")]
    ReadFailed {
        address: Address,
        length: usize,
        code: Option<i32>,
        reason: String,
    },

    #[error("Failed to write {length} bytes at {address}: {reason}")]
    WriteFailed {
        address: Address,
        length: usize,
        code: Option<i32>,
        reason: String,
    },

    #[error("Malformed memory map line {line:?}: {reason}")]
    MapsParse { line: String, reason: String },

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Invalid transfer length: {0}")]
    InvalidLength(String),

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Invalid region pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates an attach error from a raw OS error code
    pub fn attach_failed(pid: ProcessId, operation: &'static str, code: i32) -> Self {
        MemoryError::AttachFailed {
            pid,
            operation,
            code,
            message: describe_os_error(code),
        }
    }

    /// Creates a detach error from a raw OS error code
    pub fn detach_failed(pid: ProcessId, operation: &'static str, code: i32) -> Self {
        MemoryError::DetachFailed {
            pid,
            operation,
            code,
            message: describe_os_error(code),
        }
    }

    /// Creates a read error from an I/O error, keeping its OS code
    pub fn read_failed(address: Address, length: usize, err: &io::Error) -> Self {
        MemoryError::ReadFailed {
            address,
            length,
            code: err.raw_os_error(),
            reason: err.to_string(),
        }
    }

    /// Creates a write error from an I/O error, keeping its OS code
    pub fn write_failed(address: Address, length: usize, err: &io::Error) -> Self {
        MemoryError::WriteFailed {
            address,
            length,
            code: err.raw_os_error(),
            reason: err.to_string(),
        }
    }

    /// Creates a read error for a transfer that moved fewer bytes than requested
    pub fn short_read(address: Address, length: usize, transferred: usize) -> Self {
        MemoryError::ReadFailed {
            address,
            length,
            code: None,
            reason: format!("short read: {} of {} bytes transferred", transferred, length),
        }
    }

    /// Creates a write error for a transfer that moved fewer bytes than requested
    pub fn short_write(address: Address, length: usize, transferred: usize) -> Self {
        MemoryError::WriteFailed {
            address,
            length,
            code: None,
            reason: format!("short write: {} of {} bytes transferred", transferred, length),
        }
    }

    /// Creates a maps parse error for the offending line
    pub fn maps_parse(line: &str, reason: impl Into<String>) -> Self {
        MemoryError::MapsParse {
            line: line.trim_end().to_string(),
            reason: reason.into(),
        }
    }

    /// The OS error code carried by this error, if any
    pub fn os_code(&self) -> Option<i32> {
        match self {
            MemoryError::AttachFailed { code, .. } | MemoryError::DetachFailed { code, .. } => {
                Some(*code)
            }
            MemoryError::ReadFailed { code, .. } | MemoryError::WriteFailed { code, .. } => *code,
            MemoryError::IoError(err) => err.raw_os_error(),
            _ => None,
        }
    }

    /// True when the error means the target process has exited
    pub fn is_process_gone(&self) -> bool {
        match self {
            MemoryError::ProcessNotFound(_) => true,
            MemoryError::IoError(err) => err.kind() == io::ErrorKind::NotFound,
            _ => self.os_code() == Some(PROCESS_GONE),
        }
    }
}

fn describe_os_error(code: i32) -> String {
    io::Error::from_raw_os_error(code).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MemoryError::InvalidAddress("0xDEADBEEF".to_string());
        assert_eq!(err.to_string(), "Invalid memory address: 0xDEADBEEF");

        let err = MemoryError::short_read(Address::new(0x1000), 8, 3);
        assert_eq!(
            err.to_string(),
            "Failed to read 8 bytes at 0x1000: short read: 3 of 8 bytes transferred"
        );
    }

    #[test]
    fn test_attach_failed_names_operation_and_code() {
        let err = MemoryError::attach_failed(42, "ptrace(PTRACE_SEIZE)", 1);
        let text = err.to_string();
        assert!(text.contains("process 42"));
        assert!(text.contains("ptrace(PTRACE_SEIZE)"));
        assert!(text.contains("OS error 1"));
        assert_eq!(err.os_code(), Some(1));
    }

    #[test]
    fn test_read_failed_keeps_os_code() {
        let io_err = io::Error::from_raw_os_error(5);
        let err = MemoryError::read_failed(Address::new(0x2000), 4, &io_err);
        assert_eq!(err.os_code(), Some(5));
        match err {
            MemoryError::ReadFailed {
                address, length, ..
            } => {
                assert_eq!(address, Address::new(0x2000));
                assert_eq!(length, 4);
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_short_transfers_have_no_os_code() {
        assert_eq!(
            MemoryError::short_write(Address::new(0x10), 4, 0).os_code(),
            None
        );
    }

    #[test]
    fn test_is_process_gone() {
        assert!(MemoryError::detach_failed(1, "kill(SIGSTOP)", PROCESS_GONE).is_process_gone());
        assert!(MemoryError::ProcessNotFound("pid 7".to_string()).is_process_gone());
        assert!(MemoryError::from(io::Error::from(io::ErrorKind::NotFound)).is_process_gone());
        assert!(!MemoryError::detach_failed(1, "kill(SIGSTOP)", 1).is_process_gone());
        assert!(!MemoryError::InvalidHandle("closed".to_string()).is_process_gone());
    }

    #[test]
    fn test_maps_parse_trims_newline() {
        let err = MemoryError::maps_parse("zz-10 r--p\n", "bad range");
        match err {
            MemoryError::MapsParse { line, reason } => {
                assert_eq!(line, "zz-10 r--p");
                assert_eq!(reason, "bad range");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_from_implementations() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "test");
        let mem_err: MemoryError = io_err.into();
        assert!(matches!(mem_err, MemoryError::IoError(_)));

        let cfg_err = ConfigError::Invalid("bad".to_string());
        let mem_err: MemoryError = cfg_err.into();
        assert!(matches!(mem_err, MemoryError::Config(_)));
    }
}
