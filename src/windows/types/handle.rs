//! Safe HANDLE wrapper with automatic cleanup

use crate::windows::bindings::kernel32;
use std::fmt;
use winapi::um::winnt::HANDLE;

/// Owned process handle, closed on drop
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    /// Take ownership of a raw handle
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    /// Get the raw handle
    pub fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // Nothing useful to do if close fails during drop
            unsafe {
                let _ = kernel32::close_handle(self.handle);
            }
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", self.handle)
    }
}

// Process handles are plain kernel object references; the calls made
// through them (VirtualQueryEx, ReadProcessMemory) are thread-safe.
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_handle_creation() {
        let handle = Handle::new(ptr::null_mut());
        assert_eq!(handle.raw(), ptr::null_mut());
        assert!(format!("{:?}", handle).starts_with("Handle("));
    }

    #[test]
    fn test_null_handle_drop() {
        {
            let _handle = Handle::new(ptr::null_mut());
        }
    }
}
