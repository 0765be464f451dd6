//! Memory region enumeration over a mapping table

use super::filter::{IncludePatterns, RegionFilter};
use super::maps::parse_maps_line;
use crate::core::types::{Address, MemoryError, MemoryRegion, MemoryResult, ProcessId};
use crate::procfs::ProcFs;
use std::io::{self, BufRead};
use tracing::{debug, trace};

/// Streams eligible regions out of a mapping table, in table order
///
/// The table is consumed lazily; each item is either the next admitted
/// region or the first parse/IO failure, after which iteration stops.
pub struct RegionEnumerator<'f, R> {
    lines: io::Lines<R>,
    filter: &'f RegionFilter,
    include: IncludePatterns,
    writable_only: bool,
    previous_end: Option<Address>,
    failed: bool,
}

impl<'f, R: BufRead> RegionEnumerator<'f, R> {
    /// Create a new region enumerator over `reader`
    pub fn new(
        reader: R,
        filter: &'f RegionFilter,
        writable_only: bool,
        include: IncludePatterns,
    ) -> Self {
        RegionEnumerator {
            lines: reader.lines(),
            filter,
            include,
            writable_only,
            previous_end: None,
            failed: false,
        }
    }

    /// Get the next admitted region
    fn next_region(&mut self) -> Option<MemoryResult<MemoryRegion>> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(MemoryError::IoError(err))),
            };

            if line.trim().is_empty() {
                continue;
            }

            if self.filter.is_builtin_excluded(&line) {
                trace!(line = %line, "skipping built-in excluded mapping");
                continue;
            }

            let region = match parse_maps_line(&line) {
                Ok(region) => region,
                Err(err) => return Some(Err(err)),
            };

            // A target remapping while the table is read can yield a stale line
            if let Some(previous_end) = self.previous_end {
                if region.start < previous_end {
                    debug!(line = %line, previous_end = %previous_end, "skipping out-of-order mapping");
                    continue;
                }
            }
            self.previous_end = Some(region.end);

            if self.filter.admits(&region, self.writable_only, &self.include) {
                return Some(Ok(region));
            }
        }
    }
}

impl<R: BufRead> Iterator for RegionEnumerator<'_, R> {
    type Item = MemoryResult<MemoryRegion>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_region();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

/// Collects the eligible regions of one mapping table
pub fn enumerate_regions<R: BufRead, S: AsRef<str>>(
    reader: R,
    filter: &RegionFilter,
    writable_only: bool,
    include_paths: &[S],
) -> MemoryResult<Vec<MemoryRegion>> {
    RegionEnumerator::new(
        reader,
        filter,
        writable_only,
        IncludePatterns::new(include_paths),
    )
    .collect()
}

/// Reads and filters the mapping table of `pid` from the process filesystem
pub fn list_mapped_regions<S: AsRef<str>>(
    procfs: &ProcFs,
    pid: ProcessId,
    filter: &RegionFilter,
    writable_only: bool,
    include_paths: &[S],
) -> MemoryResult<Vec<MemoryRegion>> {
    let reader = procfs.open_maps(pid)?;
    let regions = enumerate_regions(reader, filter, writable_only, include_paths)?;
    debug!(
        pid,
        count = regions.len(),
        writable_only,
        "enumerated mapped regions"
    );
    Ok(regions)
}
