//! One-time choice of backend strategy
//!
//! The host's OS family, privilege level and kernel version are read
//! through a [`CapabilityProbe`] so the decision can be tested with a fake.

use super::{BackendKind, MemoryBackend};
use crate::core::types::{MemoryError, MemoryResult};
use crate::procfs::ProcFs;
use std::fmt;
use tracing::{debug, info};

/// Host operating system families the crate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Windows,
    /// Anything else, by `std::env::consts::OS` name
    Other(&'static str),
}

impl OsFamily {
    /// The family this binary was compiled for
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => OsFamily::Linux,
            "windows" => OsFamily::Windows,
            other => OsFamily::Other(other),
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Linux => f.write_str("linux"),
            OsFamily::Windows => f.write_str("windows"),
            OsFamily::Other(name) => f.write_str(name),
        }
    }
}

/// `major.minor` of a kernel release string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct KernelVersion {
    pub major: u32,
    pub minor: u32,
}

/// Oldest kernel with `process_vm_readv`/`process_vm_writev`
pub const VECTORIZED_MIN_KERNEL: KernelVersion = KernelVersion { major: 3, minor: 2 };

impl KernelVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        KernelVersion { major, minor }
    }

    /// Parses the leading `major.minor` of a release such as `6.8.0-45-generic`
    pub fn parse(release: &str) -> Option<Self> {
        let mut parts = release.trim().split('.');
        let major = leading_number(parts.next()?)?;
        let minor = leading_number(parts.next()?)?;
        Some(KernelVersion { major, minor })
    }
}

fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

/// Facts about the host that decide which backend is usable
pub trait CapabilityProbe {
    fn os_family(&self) -> OsFamily;

    /// Effective root (Linux) or elevated (Windows)
    fn is_privileged(&self) -> bool;

    /// Running kernel version, if it can be determined
    fn kernel_version(&self) -> Option<KernelVersion>;
}

/// Probe that asks the running host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl CapabilityProbe for SystemProbe {
    fn os_family(&self) -> OsFamily {
        OsFamily::current()
    }

    #[cfg(target_os = "linux")]
    fn is_privileged(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(target_os = "linux"))]
    fn is_privileged(&self) -> bool {
        false
    }

    #[cfg(target_os = "linux")]
    fn kernel_version(&self) -> Option<KernelVersion> {
        let uts = nix::sys::utsname::uname().ok()?;
        KernelVersion::parse(uts.release().to_str()?)
    }

    #[cfg(not(target_os = "linux"))]
    fn kernel_version(&self) -> Option<KernelVersion> {
        None
    }
}

/// Picks the strategy for this host
///
/// Linux uses the vectorized copy calls when running as root on a kernel new
/// enough to have them, and the tracer strategy otherwise. Windows always
/// uses the Win32 strategy. Any other host is unsupported.
pub fn select_backend(probe: &dyn CapabilityProbe) -> MemoryResult<BackendKind> {
    let kind = match probe.os_family() {
        OsFamily::Windows => BackendKind::WindowsApi,
        OsFamily::Linux => {
            let privileged = probe.is_privileged();
            let kernel = probe.kernel_version();
            debug!(privileged, ?kernel, "probing Linux capabilities");
            match kernel {
                Some(version) if privileged && version >= VECTORIZED_MIN_KERNEL => {
                    BackendKind::VectorizedIo
                }
                _ => BackendKind::PtraceAndProcMem,
            }
        }
        OsFamily::Other(name) => {
            return Err(MemoryError::UnsupportedPlatform(format!(
                "{}: only Linux and Windows are supported",
                name
            )))
        }
    };
    info!(backend = %kind, "selected memory backend");
    Ok(kind)
}

/// Honours an explicit preference, or falls back to [`select_backend`]
///
/// A preferred strategy built for another OS family is rejected.
pub fn resolve_backend(
    preferred: Option<BackendKind>,
    probe: &dyn CapabilityProbe,
) -> MemoryResult<BackendKind> {
    match preferred {
        None => select_backend(probe),
        Some(kind) => {
            let host = probe.os_family();
            if kind.os_family() != host {
                return Err(MemoryError::UnsupportedPlatform(format!(
                    "{} backend cannot run on {}",
                    kind, host
                )));
            }
            info!(backend = %kind, "using configured memory backend");
            Ok(kind)
        }
    }
}

/// Builds an unattached backend of the given kind
pub fn create_backend(kind: BackendKind, procfs: &ProcFs) -> MemoryResult<Box<dyn MemoryBackend>> {
    match kind {
        #[cfg(target_os = "linux")]
        BackendKind::PtraceAndProcMem => Ok(Box::new(super::ptrace::PtraceBackend::new(
            procfs.clone(),
        ))),
        #[cfg(target_os = "linux")]
        BackendKind::VectorizedIo => Ok(Box::new(super::vectorized::VectorizedBackend::new())),
        #[cfg(windows)]
        BackendKind::WindowsApi => Ok(Box::new(super::windows::WindowsBackend::new())),
        #[allow(unreachable_patterns)]
        other => {
            let _ = procfs;
            Err(MemoryError::UnsupportedPlatform(format!(
                "{} backend is not built for {}",
                other,
                OsFamily::current()
            )))
        }
    }
}
