//! Memory-Edit: attach to a running process, read and write its memory, and
//! list its mapped regions
//!
//! ```no_run
//! use memory_edit::{Address, ProcessHandle};
//!
//! # fn main() -> memory_edit::MemoryResult<()> {
//! if let Some(pid) = ProcessHandle::get_pid_by_name("game")? {
//!     let mut handle = ProcessHandle::attach(pid)?;
//!     for region in handle.list_mapped_regions(true, &[] as &[&str])? {
//!         println!("{}", region);
//!     }
//!     handle.write_memory(Address::new(0x601040), &42u32.to_le_bytes())?;
//!     handle.close()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod core;
pub mod logging;
pub mod memory;
pub mod process;
pub mod procfs;
#[cfg(windows)]
pub mod windows;

pub use backend::{BackendKind, CapabilityProbe, MemoryBackend, SystemProbe};
pub use core::types::{
    Address, MemoryError, MemoryRegion, MemoryResult, ProcessId, RegionPermissions,
};
pub use core::{AUTHORS, VERSION};
pub use logging::init_logging;
pub use memory::regions::RegionFilter;
pub use process::{with_process, AttachOptions, ProcessHandle};
pub use procfs::ProcFs;
