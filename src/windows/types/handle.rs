//! Safe HANDLE wrapper with automatic cleanup

use crate::windows::bindings::kernel32;
use std::io;
use std::ptr;
use winapi::um::winnt::HANDLE;

/// Owned Windows HANDLE, closed on drop
#[derive(Debug)]
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    pub fn null() -> Self {
        Handle {
            handle: ptr::null_mut(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    pub fn raw(&self) -> HANDLE {
        self.handle
    }

    /// Closes now, reporting the OS error that `Drop` would swallow
    pub fn close(mut self) -> io::Result<()> {
        let handle = self.handle;
        self.handle = ptr::null_mut();
        unsafe { kernel32::close_handle(handle) }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                let _ = kernel32::close_handle(self.handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        let handle = Handle::null();
        assert!(handle.is_null());
        assert_eq!(handle.raw(), ptr::null_mut());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_close_reports_success() {
        let handle = kernel32::open_process(std::process::id(), kernel32::QUERY_ACCESS).unwrap();
        assert!(!handle.is_null());
        assert!(handle.close().is_ok());
    }
}
