//! Mapped region descriptors

use super::{Address, MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission flags of a mapped region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionPermissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    pub shared: bool,
}

impl RegionPermissions {
    pub const fn new(read: bool, write: bool, execute: bool, shared: bool) -> Self {
        RegionPermissions {
            read,
            write,
            execute,
            shared,
        }
    }

    /// Read-only private mapping
    pub const fn read_only() -> Self {
        Self::new(true, false, false, false)
    }

    /// Read-write private mapping
    pub const fn read_write() -> Self {
        Self::new(true, true, false, false)
    }
}

/// Parses the four-character `rwxp` column of a memory map line
impl FromStr for RegionPermissions {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err(MemoryError::maps_parse(
                s,
                "permission field must be four characters",
            ));
        }

        let flag = |index: usize, set: u8| -> MemoryResult<bool> {
            match bytes[index] {
                b'-' => Ok(false),
                b if b == set => Ok(true),
                _ => Err(MemoryError::maps_parse(
                    s,
                    format!("unexpected permission flag at position {}", index),
                )),
            }
        };

        let shared = match bytes[3] {
            b's' => true,
            b'p' | b'-' => false,
            _ => {
                return Err(MemoryError::maps_parse(
                    s,
                    "sharing flag must be 's' or 'p'",
                ))
            }
        };

        Ok(RegionPermissions {
            read: flag(0, b'r')?,
            write: flag(1, b'w')?,
            execute: flag(2, b'x')?,
            shared,
        })
    }
}

impl fmt::Display for RegionPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' },
            if self.shared { 's' } else { 'p' },
        )
    }
}

/// A mapped address range `[start, end)` taken from one snapshot of the map table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub start: Address,
    pub end: Address,
    pub permissions: RegionPermissions,
    /// Offset into the backing file
    pub offset: u64,
    /// Backing path; empty for anonymous mappings
    pub path: String,
}

impl MemoryRegion {
    /// Creates an anonymous region; `start` must be below `end`
    pub fn new(start: Address, end: Address, permissions: RegionPermissions) -> MemoryResult<Self> {
        if start >= end {
            return Err(MemoryError::InvalidAddress(format!(
                "region start {} is not below end {}",
                start, end
            )));
        }
        Ok(MemoryRegion {
            start,
            end,
            permissions,
            offset: 0,
            path: String::new(),
        })
    }

    /// Sets the backing path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// The `(start, end)` pair
    pub fn bounds(&self) -> (Address, Address) {
        (self.start, self.end)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.end.as_usize() - self.start.as_usize()
    }

    /// Check if an address is within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.start && address < self.end
    }

    /// True for mappings with no backing path
    pub fn is_anonymous(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}", self.start, self.end, self.permissions)?;
        if !self.path.is_empty() {
            write!(f, " {}", self.path)?;
        }
        Ok(())
    }
}
