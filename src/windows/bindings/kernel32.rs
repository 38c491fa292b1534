//! Kernel32.dll bindings for process and memory operations

use crate::core::types::{Address, AddressSpaceBounds, MemoryError, MemoryResult};
use crate::windows::utils::{ErrorCode, WinError};
use std::mem;
use winapi::shared::minwindef::{FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::sysinfoapi::{GetSystemInfo, SYSTEM_INFO};
use winapi::um::winnt::{HANDLE, MEMORY_BASIC_INFORMATION};

/// Safe wrapper for OpenProcess
pub fn open_process(pid: u32, desired_access: u32) -> MemoryResult<HANDLE> {
    let handle = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if !handle.is_null() {
        return Ok(handle);
    }

    let err = WinError::new("OpenProcess");
    if err.code() == ErrorCode::AccessDenied {
        Err(MemoryError::access_denied(pid, err.message()))
    } else {
        Err(MemoryError::OpenFailed {
            pid,
            reason: err.to_string(),
        })
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle that is not used afterwards
pub unsafe fn close_handle(handle: HANDLE) -> MemoryResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(WinError::new("CloseHandle").into_memory_error())
    } else {
        Ok(())
    }
}

/// Safe wrapper for ReadProcessMemory
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_READ`
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: usize,
    buffer: &mut [u8],
) -> MemoryResult<usize> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        let err = WinError::new("ReadProcessMemory");
        return Err(match err.code() {
            ErrorCode::PartialCopy => MemoryError::read_failed(
                Address::new(address),
                format!("partial copy: {} of {} bytes", bytes_read, buffer.len()),
            ),
            _ => MemoryError::read_failed(Address::new(address), err.to_string()),
        });
    }
    Ok(bytes_read)
}

/// Safe wrapper for VirtualQueryEx
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_QUERY_INFORMATION`
pub unsafe fn virtual_query_ex(
    handle: HANDLE,
    address: usize,
) -> MemoryResult<MEMORY_BASIC_INFORMATION> {
    let mut mbi: MEMORY_BASIC_INFORMATION = mem::zeroed();

    let result = VirtualQueryEx(
        handle,
        address as LPCVOID,
        &mut mbi,
        mem::size_of::<MEMORY_BASIC_INFORMATION>(),
    );

    if result == 0 {
        Err(MemoryError::query_failed(
            Address::new(address),
            WinError::new("VirtualQueryEx").to_string(),
        ))
    } else {
        Ok(mbi)
    }
}

/// Application address range reported by `GetSystemInfo`.
///
/// The OS reports an inclusive maximum; the returned bounds are half-open.
pub fn application_address_range() -> AddressSpaceBounds {
    let mut info: SYSTEM_INFO = unsafe { mem::zeroed() };
    unsafe { GetSystemInfo(&mut info) };

    let min = info.lpMinimumApplicationAddress as usize;
    let max = (info.lpMaximumApplicationAddress as usize).saturating_add(1);
    AddressSpaceBounds::new(Address::new(min), Address::new(max))
}
