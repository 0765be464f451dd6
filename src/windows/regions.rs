//! Region listing by walking `VirtualQueryEx`

use crate::core::types::{Address, MemoryRegion, MemoryResult, ProcessId, RegionPermissions};
use crate::memory::regions::{IncludePatterns, RegionFilter};
use crate::windows::bindings::kernel32;
use tracing::debug;
use winapi::um::winnt::{
    MEMORY_BASIC_INFORMATION, MEM_COMMIT, MEM_MAPPED, PAGE_EXECUTE, PAGE_EXECUTE_READ,
    PAGE_EXECUTE_READWRITE, PAGE_EXECUTE_WRITECOPY, PAGE_GUARD, PAGE_NOACCESS, PAGE_READONLY,
    PAGE_READWRITE, PAGE_WRITECOPY,
};

/// Maps a page protection constant onto map-style permissions
pub fn protection_to_permissions(protect: u32, shared: bool) -> RegionPermissions {
    if protect & (PAGE_GUARD | PAGE_NOACCESS) != 0 {
        return RegionPermissions::new(false, false, false, shared);
    }
    let (read, write, execute) = match protect & 0xFF {
        PAGE_READONLY => (true, false, false),
        PAGE_READWRITE | PAGE_WRITECOPY => (true, true, false),
        PAGE_EXECUTE => (false, false, true),
        PAGE_EXECUTE_READ => (true, false, true),
        PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY => (true, true, true),
        _ => (false, false, false),
    };
    RegionPermissions::new(read, write, execute, shared)
}

fn to_region(mbi: &MEMORY_BASIC_INFORMATION) -> Option<MemoryRegion> {
    if mbi.State != MEM_COMMIT {
        return None;
    }
    let start = Address::new(mbi.BaseAddress as usize);
    let end = start.checked_add(mbi.RegionSize)?;
    let permissions = protection_to_permissions(mbi.Protect, mbi.Type == MEM_MAPPED);
    MemoryRegion::new(start, end, permissions).ok()
}

/// Committed regions of `pid` that pass `filter`, lowest address first
///
/// Backing paths are not resolved, so include patterns only ever match
/// the empty path.
pub fn list_mapped_regions<S: AsRef<str>>(
    pid: ProcessId,
    filter: &RegionFilter,
    writable_only: bool,
    include_paths: &[S],
) -> MemoryResult<Vec<MemoryRegion>> {
    let handle = kernel32::open_process(pid, kernel32::QUERY_ACCESS)?;
    let include = IncludePatterns::new(include_paths);

    let mut regions = Vec::new();
    let mut address = 0usize;
    while let Some(mbi) = kernel32::virtual_query_ex(&handle, address)? {
        if let Some(region) = to_region(&mbi) {
            if filter.admits(&region, writable_only, &include) {
                regions.push(region);
            }
        }
        match address.checked_add(mbi.RegionSize) {
            Some(next) if mbi.RegionSize > 0 => address = next,
            _ => break,
        }
    }

    debug!(pid, count = regions.len(), writable_only, "enumerated committed regions");
    Ok(regions)
}
