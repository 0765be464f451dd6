//! Win32 strategy: a process handle with VM read/write rights

use super::{not_attached, BackendKind, MemoryBackend};
use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::windows::{kernel32, Handle};
use tracing::debug;

#[derive(Debug, Default)]
pub struct WindowsBackend {
    target: Option<(ProcessId, Handle)>,
}

impl WindowsBackend {
    pub fn new() -> Self {
        WindowsBackend { target: None }
    }

    fn handle(&self) -> MemoryResult<&Handle> {
        self.target
            .as_ref()
            .map(|(_, handle)| handle)
            .ok_or_else(|| not_attached(self.kind()))
    }
}

impl MemoryBackend for WindowsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::WindowsApi
    }

    fn attach(&mut self, pid: ProcessId) -> MemoryResult<()> {
        if let Some((current, _)) = &self.target {
            return Err(MemoryError::InvalidHandle(format!(
                "windows backend is already attached to process {}",
                current
            )));
        }
        let handle = kernel32::open_process(pid, kernel32::MEMORY_ACCESS).map_err(|err| {
            MemoryError::attach_failed(pid, "OpenProcess", err.raw_os_error().unwrap_or_default())
        })?;
        debug!(pid, "opened process handle");
        self.target = Some((pid, handle));
        Ok(())
    }

    fn detach(&mut self) -> MemoryResult<()> {
        match self.target.take() {
            Some((pid, handle)) => {
                handle.close().map_err(|err| {
                    MemoryError::detach_failed(
                        pid,
                        "CloseHandle",
                        err.raw_os_error().unwrap_or_default(),
                    )
                })?;
                debug!(pid, "closed process handle");
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        let handle = self.handle()?;
        let length = buffer.len();
        let transferred = kernel32::read_process_memory(handle, address.as_usize(), buffer)
            .map_err(|err| MemoryError::read_failed(address, length, &err))?;
        if transferred != length {
            return Err(MemoryError::short_read(address, length, transferred));
        }
        Ok(())
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        let handle = self.handle()?;
        let length = data.len();
        let transferred = kernel32::write_process_memory(handle, address.as_usize(), data)
            .map_err(|err| MemoryError::write_failed(address, length, &err))?;
        if transferred != length {
            return Err(MemoryError::short_write(address, length, transferred));
        }
        Ok(())
    }
}
