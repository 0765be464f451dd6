//! Core type definitions for Memory-Edit
//!
//! Address wrappers, region descriptors and the error type shared by every
//! backend.

mod address;
mod error;
mod region;

// Re-export all public types
pub use address::Address;
pub use error::{MemoryError, MemoryResult};
pub use region::{MemoryRegion, RegionPermissions};

/// Numeric process identifier
pub type ProcessId = u32;
