//! Memory map enumeration and transfer checks
//!
//! - `regions`: mapping-table parsing, filtering and enumeration
//! - transfer length validation shared by every backend

pub mod regions;

pub use regions::{
    enumerate_regions, list_mapped_regions, parse_maps_line, IncludePatterns, RegionEnumerator,
    RegionFilter,
};

use crate::core::types::{Address, MemoryError, MemoryResult};

/// Validates a requested read length against the per-handle ceiling
pub fn validate_read_length(address: Address, length: usize, max: usize) -> MemoryResult<()> {
    if length == 0 {
        return Err(MemoryError::InvalidLength(format!(
            "read at {} must request at least one byte",
            address
        )));
    }
    if length > max {
        return Err(MemoryError::InvalidLength(format!(
            "read of {} bytes at {} exceeds the {} byte limit",
            length, address, max
        )));
    }
    validate_span(address, length)
}

/// Validates a write buffer
pub fn validate_write_length(address: Address, length: usize) -> MemoryResult<()> {
    if length == 0 {
        return Err(MemoryError::InvalidLength(format!(
            "write at {} must carry at least one byte",
            address
        )));
    }
    validate_span(address, length)
}

fn validate_span(address: Address, length: usize) -> MemoryResult<()> {
    match address.checked_add(length) {
        Some(_) => Ok(()),
        None => Err(MemoryError::InvalidAddress(format!(
            "{} + {} bytes wraps the address space",
            address, length
        ))),
    }
}
