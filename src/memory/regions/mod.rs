//! Memory region enumeration and filtering
//!
//! Parses a process's mapping table into [`MemoryRegion`]s and decides which
//! of them are eligible for reading or writing.
//!
//! [`MemoryRegion`]: crate::core::types::MemoryRegion

pub mod enumerator;
pub mod filter;
pub mod maps;

pub use enumerator::{enumerate_regions, list_mapped_regions, RegionEnumerator};
pub use filter::{IncludePatterns, RegionFilter};
pub use maps::parse_maps_line;
