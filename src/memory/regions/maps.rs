//! Parser for single lines of a process mapping table
//!
//! Line grammar: `start-end perms offset dev inode [path]`, fields separated
//! by whitespace, addresses in lowercase hex. The path is optional and may
//! itself contain whitespace.

use crate::core::types::{Address, MemoryError, MemoryRegion, MemoryResult, RegionPermissions};

/// Index of the first path field
const PATH_FIELD: usize = 5;

/// Parses one mapping-table line into a region
///
/// Lines with fewer than six fields get an empty path. Path fields from
/// index five onward are re-joined with single spaces; this assumes the
/// five preceding fields are always present and would fold a missing field's
/// neighbour into the path if the table layout ever changed.
pub fn parse_maps_line(line: &str) -> MemoryResult<MemoryRegion> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(MemoryError::maps_parse(
            line,
            "expected at least an address range and permissions",
        ));
    }

    let (start, end) = parse_range(line, fields[0])?;
    let permissions: RegionPermissions = fields[1]
        .parse()
        .map_err(|_| MemoryError::maps_parse(line, "malformed permission field"))?;

    let offset = match fields.get(2) {
        Some(raw) => u64::from_str_radix(raw, 16)
            .map_err(|_| MemoryError::maps_parse(line, "malformed offset field"))?,
        None => 0,
    };

    let path = if fields.len() > PATH_FIELD {
        fields[PATH_FIELD..].join(" ")
    } else {
        String::new()
    };

    Ok(MemoryRegion {
        start,
        end,
        permissions,
        offset,
        path,
    })
}

/// Parses `start-end`; both bounds are required and `start < end`
fn parse_range(line: &str, raw: &str) -> MemoryResult<(Address, Address)> {
    let (start, end) = raw
        .split_once('-')
        .ok_or_else(|| MemoryError::maps_parse(line, "address range has no '-' separator"))?;

    let start = Address::from_hex(start)
        .map_err(|_| MemoryError::maps_parse(line, "malformed range start"))?;
    let end =
        Address::from_hex(end).map_err(|_| MemoryError::maps_parse(line, "malformed range end"))?;

    if start >= end {
        return Err(MemoryError::maps_parse(
            line,
            "range start is not below range end",
        ));
    }

    Ok((start, end))
}
