//! Tracer strategy: `PTRACE_SEIZE` plus `/proc/<pid>/mem`
//!
//! Seizing makes the caller the target's tracer without stopping it, which
//! is what the kernel requires before `/proc/<pid>/mem` can be read or
//! written by an unprivileged process. The relationship is bound to the
//! attaching thread.

use super::{not_attached, BackendKind, MemoryBackend};
use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::procfs::ProcFs;
use nix::errno::Errno;
use nix::sys::ptrace;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use tracing::{debug, trace, warn};

/// Tracer-based backend
#[derive(Debug)]
pub struct PtraceBackend {
    procfs: ProcFs,
    pid: Option<ProcessId>,
    // ptrace relationships belong to the thread that seized the target
    _not_send: PhantomData<*const ()>,
}

impl PtraceBackend {
    pub fn new(procfs: ProcFs) -> Self {
        PtraceBackend {
            procfs,
            pid: None,
            _not_send: PhantomData,
        }
    }

    fn attached(&self) -> MemoryResult<ProcessId> {
        self.pid.ok_or_else(|| not_attached(self.kind()))
    }
}

/// Converts a process id to the kernel's signed representation
pub(crate) fn target_pid(pid: ProcessId) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

impl MemoryBackend for PtraceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::PtraceAndProcMem
    }

    fn attach(&mut self, pid: ProcessId) -> MemoryResult<()> {
        if let Some(current) = self.pid {
            return Err(MemoryError::InvalidHandle(format!(
                "ptrace backend is already attached to process {}",
                current
            )));
        }
        let target = target_pid(pid).ok_or_else(|| {
            MemoryError::attach_failed(pid, "ptrace(PTRACE_SEIZE)", Errno::ESRCH as i32)
        })?;

        ptrace::seize(target, ptrace::Options::empty())
            .map_err(|errno| MemoryError::attach_failed(pid, "ptrace(PTRACE_SEIZE)", errno as i32))?;

        debug!(pid, "seized process");
        self.pid = Some(pid);
        Ok(())
    }

    /// Stops the target, waits for the stop, detaches, then resumes it
    ///
    /// A target that has exited at any step makes the whole sequence succeed.
    /// The resume signal is sent even when the detach itself failed.
    fn detach(&mut self) -> MemoryResult<()> {
        let pid = match self.pid.take() {
            Some(pid) => pid,
            None => return Ok(()),
        };
        let target = match target_pid(pid) {
            Some(target) => target,
            None => return Ok(()),
        };

        match kill(target, Signal::SIGSTOP) {
            Ok(()) => {}
            Err(Errno::ESRCH) => {
                debug!(pid, "process exited before detach");
                return Ok(());
            }
            Err(errno) => return Err(MemoryError::detach_failed(pid, "kill(SIGSTOP)", errno as i32)),
        }

        match waitpid(target, None) {
            Ok(status) => trace!(pid, ?status, "target stopped"),
            // Already reaped or not our child; the stop was still delivered
            Err(Errno::ECHILD) => {}
            Err(Errno::ESRCH) => return Ok(()),
            Err(errno) => return Err(MemoryError::detach_failed(pid, "waitpid", errno as i32)),
        }

        let detached = match ptrace::detach(target, None) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => return Ok(()),
            Err(errno) => {
                warn!(pid, error = %errno, "ptrace detach failed, resuming target anyway");
                Err(MemoryError::detach_failed(pid, "ptrace(PTRACE_DETACH)", errno as i32))
            }
        };

        match kill(target, Signal::SIGCONT) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(errno) => {
                detached?;
                return Err(MemoryError::detach_failed(pid, "kill(SIGCONT)", errno as i32));
            }
        }

        detached?;
        debug!(pid, "detached from process");
        Ok(())
    }

    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        let pid = self.attached()?;
        let length = buffer.len();
        let fail = |err: io::Error| MemoryError::read_failed(address, length, &err);

        let mut mem = self.procfs.open_mem(pid, false).map_err(fail)?;
        mem.seek(SeekFrom::Start(address.as_u64())).map_err(fail)?;

        let mut filled = 0;
        while filled < length {
            match mem.read(&mut buffer[filled..]) {
                Ok(0) => return Err(MemoryError::short_read(address, length, filled)),
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(fail(err)),
            }
        }
        Ok(())
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        let pid = self.attached()?;
        let length = data.len();
        let fail = |err: io::Error| MemoryError::write_failed(address, length, &err);

        let mut mem = self.procfs.open_mem(pid, true).map_err(fail)?;
        mem.seek(SeekFrom::Start(address.as_u64())).map_err(fail)?;

        let mut written = 0;
        while written < length {
            match mem.write(&data[written..]) {
                Ok(0) => return Err(MemoryError::short_write(address, length, written)),
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(fail(err)),
            }
        }
        mem.flush().map_err(fail)
    }
}
