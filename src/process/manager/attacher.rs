//! Attachment options and scoped acquisition

use crate::backend::BackendKind;
use crate::config::{Config, DEFAULT_EXCLUSIONS};
use crate::core::types::{MemoryResult, ProcessId};
use crate::memory::regions::RegionFilter;
use crate::process::ProcessHandle;
use crate::procfs::{ProcFs, DEFAULT_PROC_ROOT};
use std::path::PathBuf;
use tracing::warn;

/// Default ceiling for a single read, 64 MiB
pub const DEFAULT_MAX_READ_SIZE: usize = 64 * 1024 * 1024;

/// Options for process attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOptions {
    /// Force a strategy instead of probing the host
    pub backend: Option<BackendKind>,
    /// Substrings that drop a map line before parsing
    pub default_exclusions: Vec<String>,
    /// Initial glob blacklist for region listing
    pub exclude_patterns: Vec<String>,
    /// Root of the process filesystem
    pub proc_root: PathBuf,
    /// Largest single read accepted by the handle
    pub max_read_size: usize,
}

impl Default for AttachOptions {
    fn default() -> Self {
        AttachOptions {
            backend: None,
            default_exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: Vec::new(),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            max_read_size: DEFAULT_MAX_READ_SIZE,
        }
    }
}

impl AttachOptions {
    /// Builds options from a loaded configuration
    pub fn from_config(config: &Config) -> MemoryResult<Self> {
        let preferred = config.backend.preferred.trim();
        let backend = if preferred.eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(preferred.parse::<BackendKind>()?)
        };

        Ok(AttachOptions {
            backend,
            default_exclusions: config.memory.default_exclusions.clone(),
            exclude_patterns: config.memory.exclude_patterns.clone(),
            proc_root: PathBuf::from(&config.backend.proc_root),
            max_read_size: config.memory.max_read_size,
        })
    }

    pub fn with_backend(mut self, kind: BackendKind) -> Self {
        self.backend = Some(kind);
        self
    }

    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_max_read_size(mut self, max: usize) -> Self {
        self.max_read_size = max;
        self
    }

    pub(crate) fn procfs(&self) -> ProcFs {
        ProcFs::new(&self.proc_root)
    }

    pub(crate) fn region_filter(&self) -> MemoryResult<RegionFilter> {
        RegionFilter::new(
            self.default_exclusions.clone(),
            self.exclude_patterns.clone(),
        )
    }
}

/// Attaches to `pid`, runs `f`, and closes the handle on every exit path
///
/// An error from `f` takes precedence over an error from closing; the
/// close error is then only logged.
pub fn with_process<T, F>(pid: ProcessId, options: &AttachOptions, f: F) -> MemoryResult<T>
where
    F: FnOnce(&mut ProcessHandle) -> MemoryResult<T>,
{
    let mut handle = ProcessHandle::attach_with_options(pid, options)?;
    let result = f(&mut handle);
    let closed = handle.close();

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(pid, error = %close_err, "close failed after scoped operation error");
            Err(err)
        }
    }
}
