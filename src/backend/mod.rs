//! Interchangeable strategies for reaching into another process
//!
//! Every strategy implements [`MemoryBackend`]: attach, detach, read and
//! write. Which one a handle uses is decided once, at construction, by
//! [`selector::select_backend`].
//!
//! - **ptrace** (Linux): seize the target as a tracer, move bytes through
//!   `/proc/<pid>/mem`
//!   - See: [ptrace(2)](https://man7.org/linux/man-pages/man2/ptrace.2.html)
//! - **vectorized** (Linux >= 3.2, root): `process_vm_readv`/`process_vm_writev`,
//!   no persistent relationship
//!   - See: [process_vm_readv(2)](https://man7.org/linux/man-pages/man2/process_vm_readv.2.html)
//! - **windows**: `OpenProcess` + `ReadProcessMemory`/`WriteProcessMemory`

pub mod selector;

#[cfg(target_os = "linux")]
pub mod ptrace;
#[cfg(target_os = "linux")]
pub mod vectorized;
#[cfg(windows)]
pub mod windows;

pub use selector::{
    create_backend, resolve_backend, select_backend, CapabilityProbe, KernelVersion, OsFamily,
    SystemProbe, VECTORIZED_MIN_KERNEL,
};

use crate::config::ConfigError;
use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use std::fmt;
use std::str::FromStr;

/// The strategy variants; one per handle, never mixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Tracer attach plus the `/proc/<pid>/mem` pseudo-file
    PtraceAndProcMem,
    /// Single-segment `process_vm_readv`/`process_vm_writev`
    VectorizedIo,
    /// Win32 process handle with VM read/write rights
    WindowsApi,
}

impl BackendKind {
    /// Name used in configuration files
    pub const fn name(&self) -> &'static str {
        match self {
            BackendKind::PtraceAndProcMem => "ptrace",
            BackendKind::VectorizedIo => "vectorized",
            BackendKind::WindowsApi => "windows",
        }
    }

    /// Host family the strategy is built for
    pub const fn os_family(&self) -> OsFamily {
        match self {
            BackendKind::PtraceAndProcMem | BackendKind::VectorizedIo => OsFamily::Linux,
            BackendKind::WindowsApi => OsFamily::Windows,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ptrace" => Ok(BackendKind::PtraceAndProcMem),
            "vectorized" => Ok(BackendKind::VectorizedIo),
            "windows" => Ok(BackendKind::WindowsApi),
            _ => Err(MemoryError::Config(ConfigError::Invalid(format!(
                "unknown backend {:?}",
                s
            )))),
        }
    }
}

/// Attach, detach, read and write for one target process
///
/// Implementations own whatever OS relationship `attach` establishes and
/// release it in `detach`. `detach` on a backend that is not attached is a
/// no-op. Transfers must move exactly the requested number of bytes or fail.
pub trait MemoryBackend: fmt::Debug {
    /// Which strategy this is
    fn kind(&self) -> BackendKind;

    /// Establishes the relationship that makes transfers legal
    fn attach(&mut self, pid: ProcessId) -> MemoryResult<()>;

    /// Releases the relationship; a target that already exited counts as success
    fn detach(&mut self) -> MemoryResult<()>;

    /// Fills `buffer` from `address` in the target
    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()>;

    /// Copies all of `data` to `address` in the target
    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<()>;
}

/// Error for transfers attempted on a backend with no target
pub(crate) fn not_attached(kind: BackendKind) -> MemoryError {
    MemoryError::InvalidHandle(format!("{} backend is not attached to a process", kind))
}
