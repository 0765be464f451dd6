//! Core module containing fundamental types for Memory-Edit
//!
//! Address handling, region descriptors and error types used by every other
//! module.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, MemoryError, MemoryRegion, MemoryResult, ProcessId, RegionPermissions,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
