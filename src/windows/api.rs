//! [`OsAccess`] over the Win32 API

use super::bindings::{kernel32, psapi};
use super::types::{Handle, MemoryBasicInfo};
use crate::core::types::{Address, AddressSpaceBounds, MemoryResult, ProcessId, Region};
use crate::os::{OsAccess, ProcessAccess};
use lazy_static::lazy_static;

lazy_static! {
    // GetSystemInfo answers the same for every process on the machine
    static ref APPLICATION_RANGE: AddressSpaceBounds = kernel32::application_address_range();
}

/// Native Windows backend
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsApi;

impl WindowsApi {
    pub fn new() -> Self {
        WindowsApi
    }
}

impl OsAccess for WindowsApi {
    type RawHandle = Handle;

    fn name(&self) -> &'static str {
        "windows"
    }

    fn list_process_ids(&self) -> MemoryResult<Vec<ProcessId>> {
        psapi::enum_processes()
    }

    fn executable_name(&self, pid: ProcessId) -> MemoryResult<String> {
        let handle = self.open_process(pid, ProcessAccess::NAME_QUERY)?;
        unsafe { psapi::get_process_image_filename(handle.raw()) }
    }

    fn open_process(&self, pid: ProcessId, access: ProcessAccess) -> MemoryResult<Handle> {
        kernel32::open_process(pid, access.value()).map(Handle::new)
    }

    fn address_space_bounds(&self) -> MemoryResult<AddressSpaceBounds> {
        Ok(*APPLICATION_RANGE)
    }

    fn query_region(&self, handle: &Handle, address: Address) -> MemoryResult<Region> {
        let mbi = unsafe { kernel32::virtual_query_ex(handle.raw(), address.as_usize())? };
        Ok(MemoryBasicInfo::from(mbi).to_region())
    }

    fn read_memory(&self, handle: &Handle, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        unsafe { kernel32::read_process_memory(handle.raw(), address.as_usize(), buffer) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::regions::is_readable;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_current_process_name() {
        let api = WindowsApi::new();
        let name = api.executable_name(std::process::id()).unwrap();
        assert!(name.to_lowercase().ends_with(".exe"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_query_and_read_own_stack() {
        let api = WindowsApi::new();
        let handle = api
            .open_process(std::process::id(), ProcessAccess::SCAN)
            .unwrap();

        let marker = [0x5Au8; 64];
        let address = Address::new(marker.as_ptr() as usize);

        let region = api.query_region(&handle, address).unwrap();
        assert!(region.contains(address));
        assert!(is_readable(&region));

        let mut buffer = [0u8; 64];
        assert_eq!(api.read_memory(&handle, address, &mut buffer).unwrap(), 64);
        assert_eq!(buffer, marker);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_bounds_are_cached_and_ordered() {
        let api = WindowsApi::new();
        let first = api.address_space_bounds().unwrap();
        let second = api.address_space_bounds().unwrap();
        assert_eq!(first, second);
        assert!(first.min < first.max);
    }
}
