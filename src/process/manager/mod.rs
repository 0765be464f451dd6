//! Process attachment management

pub mod attacher;

pub use attacher::{with_process, AttachOptions, DEFAULT_MAX_READ_SIZE};
