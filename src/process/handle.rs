//! Attached-process handle
//!
//! A [`ProcessHandle`] owns one backend bound to one process for its whole
//! life. It is not `Send`: the tracer strategy ties the attachment to the
//! thread that made it.

use crate::backend::{
    create_backend, resolve_backend, BackendKind, CapabilityProbe, MemoryBackend, SystemProbe,
};
use crate::core::types::{Address, MemoryError, MemoryRegion, MemoryResult, ProcessId};
use crate::memory::regions::RegionFilter;
use crate::memory::{validate_read_length, validate_write_length};
use crate::process::enumerator;
use crate::process::manager::AttachOptions;
use crate::procfs::ProcFs;
use std::fmt;
use tracing::{debug, info, trace, warn};

/// An open attachment to another process
pub struct ProcessHandle {
    pid: Option<ProcessId>,
    backend: Box<dyn MemoryBackend>,
    filter: RegionFilter,
    #[cfg_attr(windows, allow(dead_code))]
    procfs: ProcFs,
    max_read_size: usize,
}

impl ProcessHandle {
    /// Attaches with default options and the backend chosen for this host
    pub fn attach(pid: ProcessId) -> MemoryResult<Self> {
        Self::attach_with_options(pid, &AttachOptions::default())
    }

    /// Attaches, honouring any backend preference in `options`
    pub fn attach_with_options(pid: ProcessId, options: &AttachOptions) -> MemoryResult<Self> {
        Self::attach_with_probe(pid, options, &SystemProbe)
    }

    /// Attaches with the backend `probe` selects
    pub fn attach_with_probe(
        pid: ProcessId,
        options: &AttachOptions,
        probe: &dyn CapabilityProbe,
    ) -> MemoryResult<Self> {
        let kind = resolve_backend(options.backend, probe)?;
        let procfs = options.procfs();
        let backend = create_backend(kind, &procfs)?;
        Self::attach_with_backend(pid, backend, options)
    }

    /// Attaches through an already-built backend
    pub fn attach_with_backend(
        pid: ProcessId,
        mut backend: Box<dyn MemoryBackend>,
        options: &AttachOptions,
    ) -> MemoryResult<Self> {
        let filter = options.region_filter()?;
        backend.attach(pid)?;
        info!(pid, backend = %backend.kind(), "attached to process");
        Ok(ProcessHandle {
            pid: Some(pid),
            backend,
            filter,
            procfs: options.procfs(),
            max_read_size: options.max_read_size,
        })
    }

    /// Target process id, `None` once closed
    pub fn pid(&self) -> Option<ProcessId> {
        self.pid
    }

    pub fn is_open(&self) -> bool {
        self.pid.is_some()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Releases the attachment; calling it again is a no-op
    ///
    /// The handle is closed afterwards even when detaching reports an error.
    pub fn close(&mut self) -> MemoryResult<()> {
        let pid = match self.pid.take() {
            Some(pid) => pid,
            None => return Ok(()),
        };
        match self.backend.detach() {
            Ok(()) => {
                debug!(pid, "closed process handle");
                Ok(())
            }
            Err(err) if err.is_process_gone() => {
                debug!(pid, "process already exited at close");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn open_pid(&self) -> MemoryResult<ProcessId> {
        self.pid
            .ok_or_else(|| MemoryError::InvalidHandle("process handle is closed".to_string()))
    }

    /// Reads exactly `length` bytes at `address`
    pub fn read_memory(&self, address: Address, length: usize) -> MemoryResult<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        self.read_into(address, &mut buffer)?;
        Ok(buffer)
    }

    /// Fills `buffer` from `address`
    pub fn read_into(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        let pid = self.open_pid()?;
        validate_read_length(address, buffer.len(), self.max_read_size)?;
        trace!(pid, %address, length = buffer.len(), "read");
        self.backend.read(address, buffer)
    }

    /// Writes all of `data` at `address`
    pub fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        let pid = self.open_pid()?;
        validate_write_length(address, data.len())?;
        trace!(pid, %address, length = data.len(), "write");
        self.backend.write(address, data)
    }

    /// Executable path of the target, or an empty string if it cannot be read
    pub fn get_path(&self) -> MemoryResult<String> {
        let pid = self.open_pid()?;
        Ok(self.path_of(pid).unwrap_or_default())
    }

    #[cfg(not(windows))]
    fn path_of(&self, pid: ProcessId) -> Option<String> {
        enumerator::process_path_in(&self.procfs, pid)
    }

    #[cfg(windows)]
    fn path_of(&self, pid: ProcessId) -> Option<String> {
        crate::windows::process_image_path(pid).ok()
    }

    /// Eligible regions of the target in ascending address order
    ///
    /// `include_paths` entries are start-anchored regexes, or literal path
    /// prefixes when they do not compile.
    pub fn list_mapped_regions<S: AsRef<str>>(
        &self,
        writable_only: bool,
        include_paths: &[S],
    ) -> MemoryResult<Vec<MemoryRegion>> {
        let pid = self.open_pid()?;
        self.regions_of(pid, writable_only, include_paths)
    }

    #[cfg(not(windows))]
    fn regions_of<S: AsRef<str>>(
        &self,
        pid: ProcessId,
        writable_only: bool,
        include_paths: &[S],
    ) -> MemoryResult<Vec<MemoryRegion>> {
        crate::memory::regions::list_mapped_regions(
            &self.procfs,
            pid,
            &self.filter,
            writable_only,
            include_paths,
        )
    }

    #[cfg(windows)]
    fn regions_of<S: AsRef<str>>(
        &self,
        pid: ProcessId,
        writable_only: bool,
        include_paths: &[S],
    ) -> MemoryResult<Vec<MemoryRegion>> {
        crate::windows::regions::list_mapped_regions(pid, &self.filter, writable_only, include_paths)
    }

    /// Replaces the glob blacklist used by later region listings
    ///
    /// A pattern that fails to compile leaves the current blacklist untouched.
    pub fn set_exclude_patterns(&mut self, patterns: Vec<String>) -> MemoryResult<()> {
        self.filter.set_exclude_patterns(patterns)
    }

    pub fn exclude_patterns(&self) -> &[String] {
        self.filter.exclude_patterns()
    }

    pub fn region_filter(&self) -> &RegionFilter {
        &self.filter
    }

    /// Ids of all live processes, ascending
    pub fn list_available_pids() -> MemoryResult<Vec<ProcessId>> {
        enumerator::list_available_pids()
    }

    /// First process whose executable base name equals `name`
    pub fn get_pid_by_name(name: &str) -> MemoryResult<Option<ProcessId>> {
        enumerator::get_pid_by_name(name)
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Some(pid) = self.pid {
            if let Err(err) = self.close() {
                warn!(pid, error = %err, "failed to detach dropped process handle");
            }
        }
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("backend", &self.backend.kind())
            .field("exclude_patterns", &self.filter.exclude_patterns())
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "process {} via {}", pid, self.backend.kind()),
            None => write!(f, "closed {} handle", self.backend.kind()),
        }
    }
}
