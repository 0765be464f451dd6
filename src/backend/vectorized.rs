//! Vectorized copy strategy: `process_vm_readv` / `process_vm_writev`
//!
//! No relationship with the target is established; every transfer is a
//! single local segment copied to or from a single remote segment. Needs
//! Linux 3.2+ and permission to inspect the target (root in practice).

use super::ptrace::target_pid;
use super::{not_attached, BackendKind, MemoryBackend};
use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use nix::errno::Errno;
use nix::sys::uio::{process_vm_readv, process_vm_writev, RemoteIoVec};
use nix::unistd::Pid;
use std::io::{self, IoSlice, IoSliceMut};
use tracing::debug;

/// Vectorized-copy backend
#[derive(Debug, Default)]
pub struct VectorizedBackend {
    pid: Option<Pid>,
}

impl VectorizedBackend {
    pub fn new() -> Self {
        VectorizedBackend { pid: None }
    }

    fn attached(&self) -> MemoryResult<Pid> {
        self.pid.ok_or_else(|| not_attached(self.kind()))
    }
}

impl MemoryBackend for VectorizedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::VectorizedIo
    }

    /// Only validates and records the id
    fn attach(&mut self, pid: ProcessId) -> MemoryResult<()> {
        let target = target_pid(pid)
            .ok_or_else(|| MemoryError::attach_failed(pid, "pid validation", Errno::EINVAL as i32))?;
        self.pid = Some(target);
        debug!(pid, "recorded target for vectorized I/O");
        Ok(())
    }

    fn detach(&mut self) -> MemoryResult<()> {
        self.pid = None;
        Ok(())
    }

    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        let pid = self.attached()?;
        let length = buffer.len();
        let remote = [RemoteIoVec {
            base: address.as_usize(),
            len: length,
        }];
        let mut local = [IoSliceMut::new(buffer)];

        let transferred = process_vm_readv(pid, &mut local, &remote)
            .map_err(|errno| MemoryError::read_failed(address, length, &io::Error::from(errno)))?;
        if transferred != length {
            return Err(MemoryError::short_read(address, length, transferred));
        }
        Ok(())
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        let pid = self.attached()?;
        let length = data.len();
        let remote = [RemoteIoVec {
            base: address.as_usize(),
            len: length,
        }];
        let local = [IoSlice::new(data)];

        let transferred = process_vm_writev(pid, &local, &remote)
            .map_err(|errno| MemoryError::write_failed(address, length, &io::Error::from(errno)))?;
        if transferred != length {
            return Err(MemoryError::short_write(address, length, transferred));
        }
        Ok(())
    }
}
