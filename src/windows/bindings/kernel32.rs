//! Kernel32.dll bindings for process handles and memory transfers
//!
//! Every wrapper reports failure as the `io::Error` built from
//! `GetLastError`, so callers keep the raw OS code.

use crate::windows::types::Handle;
use std::ffi::OsString;
use std::io;
use std::mem;
use std::os::windows::ffi::OsStringExt;
use winapi::shared::minwindef::{DWORD, FALSE, LPCVOID, LPVOID, MAX_PATH};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx, WriteProcessMemory};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winbase::QueryFullProcessImageNameW;
use winapi::um::winnt::{
    HANDLE, MEMORY_BASIC_INFORMATION, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION,
    PROCESS_VM_READ, PROCESS_VM_WRITE,
};

/// Rights needed to read, write and inspect another process
pub const MEMORY_ACCESS: DWORD =
    PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION | PROCESS_QUERY_INFORMATION;

/// Rights needed for region queries and image-name lookup only
pub const QUERY_ACCESS: DWORD = PROCESS_QUERY_INFORMATION | PROCESS_VM_READ;

/// Safe wrapper for OpenProcess
pub fn open_process(pid: u32, desired_access: DWORD) -> io::Result<Handle> {
    let raw = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if raw.is_null() {
        Err(io::Error::last_os_error())
    } else {
        Ok(Handle::new(raw))
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle not closed elsewhere
pub unsafe fn close_handle(handle: HANDLE) -> io::Result<()> {
    if handle.is_null() {
        return Ok(());
    }
    if CloseHandle(handle) == FALSE {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Safe wrapper for ReadProcessMemory; returns the bytes transferred
pub fn read_process_memory(handle: &Handle, address: usize, buffer: &mut [u8]) -> io::Result<usize> {
    let mut bytes_read = 0;
    let result = unsafe {
        ReadProcessMemory(
            handle.raw(),
            address as LPCVOID,
            buffer.as_mut_ptr() as LPVOID,
            buffer.len(),
            &mut bytes_read,
        )
    };
    if result == FALSE {
        Err(io::Error::last_os_error())
    } else {
        Ok(bytes_read)
    }
}

/// Safe wrapper for WriteProcessMemory; returns the bytes transferred
pub fn write_process_memory(handle: &Handle, address: usize, data: &[u8]) -> io::Result<usize> {
    let mut bytes_written = 0;
    let result = unsafe {
        WriteProcessMemory(
            handle.raw(),
            address as LPVOID,
            data.as_ptr() as LPCVOID,
            data.len(),
            &mut bytes_written,
        )
    };
    if result == FALSE {
        Err(io::Error::last_os_error())
    } else {
        Ok(bytes_written)
    }
}

/// Safe wrapper for VirtualQueryEx
///
/// `Ok(None)` once `address` is past the last user-mode region.
pub fn virtual_query_ex(
    handle: &Handle,
    address: usize,
) -> io::Result<Option<MEMORY_BASIC_INFORMATION>> {
    let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { mem::zeroed() };
    let written = unsafe {
        VirtualQueryEx(
            handle.raw(),
            address as LPCVOID,
            &mut mbi,
            mem::size_of::<MEMORY_BASIC_INFORMATION>(),
        )
    };
    if written == 0 {
        let err = io::Error::last_os_error();
        // ERROR_INVALID_PARAMETER marks the end of the address space
        if err.raw_os_error() == Some(87) {
            return Ok(None);
        }
        return Err(err);
    }
    Ok(Some(mbi))
}

/// Full Win32 path of the process image
pub fn query_full_process_image_name(handle: &Handle) -> io::Result<String> {
    let mut buffer = vec![0u16; MAX_PATH * 4];
    let mut size = buffer.len() as DWORD;
    let result =
        unsafe { QueryFullProcessImageNameW(handle.raw(), 0, buffer.as_mut_ptr(), &mut size) };
    if result == FALSE {
        return Err(io::Error::last_os_error());
    }
    buffer.truncate(size as usize);
    Ok(OsString::from_wide(&buffer).to_string_lossy().into_owned())
}
