//! PSAPI.dll bindings for process enumeration

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use crate::windows::utils::WinError;
use std::ffi::OsString;
use std::mem;
use std::os::windows::ffi::OsStringExt;
use winapi::shared::minwindef::{DWORD, FALSE, MAX_PATH};
use winapi::um::psapi::{EnumProcesses, GetProcessImageFileNameW};
use winapi::um::winnt::HANDLE;

const INITIAL_PID_CAPACITY: usize = 1024;

/// Safe wrapper for EnumProcesses.
///
/// `EnumProcesses` cannot report how many ids it dropped, so the buffer is
/// doubled until the OS returns fewer ids than it can hold.
pub fn enum_processes() -> MemoryResult<Vec<ProcessId>> {
    let mut capacity = INITIAL_PID_CAPACITY;
    loop {
        let mut pids = vec![0 as DWORD; capacity];
        let mut bytes_returned = 0u32;
        let buffer_bytes = (pids.len() * mem::size_of::<DWORD>()) as u32;

        let result = unsafe { EnumProcesses(pids.as_mut_ptr(), buffer_bytes, &mut bytes_returned) };
        if result == FALSE {
            return Err(MemoryError::ProcessListFailed(
                WinError::new("EnumProcesses").to_string(),
            ));
        }

        let count = bytes_returned as usize / mem::size_of::<DWORD>();
        if count < capacity {
            pids.truncate(count);
            return Ok(pids);
        }
        capacity *= 2;
    }
}

/// Safe wrapper for GetProcessImageFileNameW, returning the base file name
///
/// # Safety
/// The handle must be a valid process handle with query rights
pub unsafe fn get_process_image_filename(handle: HANDLE) -> MemoryResult<String> {
    let mut buffer = vec![0u16; MAX_PATH];

    let length = GetProcessImageFileNameW(handle, buffer.as_mut_ptr(), MAX_PATH as u32);
    if length == 0 {
        return Err(WinError::new("GetProcessImageFileNameW").into_memory_error());
    }
    buffer.truncate(length as usize);

    let path = OsString::from_wide(&buffer)
        .into_string()
        .map_err(|_| MemoryError::WindowsApi("Invalid filename encoding".to_string()))?;
    Ok(base_name(&path).to_string())
}

/// Final component of an NT device path such as `\Device\HarddiskVolume3\x\y.exe`
pub fn base_name(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}
