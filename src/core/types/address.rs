//! Memory address wrapper type with hex parsing

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An absolute address in a target process's virtual address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// Returns the address as a file offset into a process memory pseudo-file
    pub const fn as_u64(&self) -> u64 {
        self.0 as u64
    }

    /// Adds a byte length, returning `None` on overflow
    pub const fn checked_add(&self, len: usize) -> Option<Self> {
        match self.0.checked_add(len) {
            Some(value) => Some(Address(value)),
            None => None,
        }
    }

    /// Parses bare hexadecimal digits with no prefix, as the kernel prints them
    pub fn from_hex(digits: &str) -> MemoryResult<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(MemoryError::InvalidAddress(digits.to_string()));
        }
        usize::from_str_radix(digits, 16)
            .map(Address::new)
            .map_err(|_| MemoryError::InvalidAddress(digits.to_string()))
    }
}

impl FromStr for Address {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            usize::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            usize::from_str_radix(s, 16)
        } else {
            s.parse::<usize>()
        };

        value
            .map(Address::new)
            .map_err(|_| MemoryError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value)
    }
}

impl<T> From<*const T> for Address {
    fn from(ptr: *const T) -> Self {
        Address::new(ptr as usize)
    }
}

impl<T> From<*mut T> for Address {
    fn from(ptr: *mut T) -> Self {
        Address::new(ptr as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parsing() {
        assert_eq!(Address::from_str("0x1000").unwrap(), Address::new(0x1000));
        assert_eq!(Address::from_str("0X1000").unwrap(), Address::new(0x1000));
        assert_eq!(
            Address::from_str("DEADBEEF").unwrap(),
            Address::new(0xDEADBEEF)
        );
        assert_eq!(Address::from_str("4096").unwrap(), Address::new(4096));
        assert!(Address::from_str("0xZZ").is_err());
    }

    #[test]
    fn test_from_hex_is_strict() {
        assert_eq!(Address::from_hex("7ffd1000").unwrap(), Address::new(0x7ffd1000));
        assert!(Address::from_hex("").is_err());
        assert!(Address::from_hex("0x10").is_err());
        assert!(Address::from_hex("+10").is_err());
        assert!(Address::from_hex("12g4").is_err());
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            Address::new(0x1000).checked_add(0x10),
            Some(Address::new(0x1010))
        );
        assert_eq!(Address::new(usize::MAX).checked_add(1), None);
    }

    #[test]
    fn test_address_display() {
        let addr = Address::new(0xDEADBEEF);
        assert_eq!(format!("{}", addr), "0xdeadbeef");
        assert_eq!(format!("{:x}", addr), "0x00000000deadbeef");
        assert_eq!(format!("{:X}", addr), "0x00000000DEADBEEF");
    }

    #[test]
    fn test_from_pointer() {
        let value = 7u32;
        let addr = Address::from(&value as *const u32);
        assert!(!addr.is_null());
        assert!(Address::null().is_null());
    }
}
