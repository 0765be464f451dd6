//! Integration tests for backend selection through an injected capability probe

use memory_edit::backend::{
    resolve_backend, select_backend, CapabilityProbe, KernelVersion, OsFamily,
};
use memory_edit::{AttachOptions, BackendKind, MemoryError, ProcessHandle};

struct Host {
    family: OsFamily,
    root: bool,
    kernel: &'static str,
}

impl CapabilityProbe for Host {
    fn os_family(&self) -> OsFamily {
        self.family
    }

    fn is_privileged(&self) -> bool {
        self.root
    }

    fn kernel_version(&self) -> Option<KernelVersion> {
        KernelVersion::parse(self.kernel)
    }
}

fn linux(root: bool, kernel: &'static str) -> Host {
    Host {
        family: OsFamily::Linux,
        root,
        kernel,
    }
}

#[test]
fn test_selection_matrix() {
    let cases = [
        (linux(true, "6.8.0-45-generic"), BackendKind::VectorizedIo),
        (linux(true, "3.2.0"), BackendKind::VectorizedIo),
        (linux(true, "3.1.10"), BackendKind::PtraceAndProcMem),
        (linux(true, "2.6.32-754.el6"), BackendKind::PtraceAndProcMem),
        (linux(true, "garbage"), BackendKind::PtraceAndProcMem),
        (linux(false, "6.8.0"), BackendKind::PtraceAndProcMem),
        (
            Host {
                family: OsFamily::Windows,
                root: false,
                kernel: "",
            },
            BackendKind::WindowsApi,
        ),
    ];

    for (host, expected) in cases {
        assert_eq!(select_backend(&host).unwrap(), expected, "kernel {}", host.kernel);
    }
}

#[test]
fn test_unknown_os_rejected() {
    let host = Host {
        family: OsFamily::Other("freebsd"),
        root: true,
        kernel: "14.0-RELEASE",
    };
    let err = select_backend(&host).unwrap_err();
    assert!(matches!(err, MemoryError::UnsupportedPlatform(_)));
}

#[test]
fn test_cross_platform_preference_rejected() {
    let host = linux(true, "6.1.0");
    assert!(matches!(
        resolve_backend(Some(BackendKind::WindowsApi), &host),
        Err(MemoryError::UnsupportedPlatform(_))
    ));

    let host = Host {
        family: OsFamily::Windows,
        root: false,
        kernel: "",
    };
    assert!(matches!(
        resolve_backend(Some(BackendKind::PtraceAndProcMem), &host),
        Err(MemoryError::UnsupportedPlatform(_))
    ));
}

#[test]
fn test_attach_on_unsupported_host_fails_before_touching_target() {
    let host = Host {
        family: OsFamily::Other("plan9"),
        root: false,
        kernel: "",
    };
    let err = ProcessHandle::attach_with_probe(1, &AttachOptions::default(), &host).unwrap_err();
    assert!(matches!(err, MemoryError::UnsupportedPlatform(_)));
}

#[test]
#[cfg(target_os = "linux")]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_probe_chooses_vectorized_for_self() {
    let host = linux(true, "6.1.0");
    let handle =
        ProcessHandle::attach_with_probe(std::process::id(), &AttachOptions::default(), &host)
            .unwrap();
    assert_eq!(handle.backend_kind(), BackendKind::VectorizedIo);
}
