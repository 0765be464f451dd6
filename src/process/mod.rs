//! Process attachment and discovery
//!
//! - [`ProcessHandle`]: one attachment, with raw transfers and region listing
//! - [`with_process`]: attach, run, close
//! - discovery: list ids, look a process up by executable name

pub mod enumerator;
pub mod handle;
pub mod manager;

pub use enumerator::{
    executable_name, find_pid_by_name_in, get_pid_by_name, get_process_path, list_available_pids,
    list_pids_in, process_path_in,
};
pub use handle::ProcessHandle;
pub use manager::{with_process, AttachOptions, DEFAULT_MAX_READ_SIZE};
