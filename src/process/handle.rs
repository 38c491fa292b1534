//! Process handle bound to one OS backend

use crate::core::types::{Address, MemoryResult, ProcessId, Region};
use crate::os::{OsAccess, ProcessAccess};
use std::fmt;

/// Capability to query and read one target process.
///
/// The handle only performs read-only OS calls, so a shared reference can be
/// handed to any number of reader threads. Once the target exits, calls
/// through the handle fail rather than crash.
pub struct ProcessHandle<'a, A: OsAccess> {
    api: &'a A,
    raw: A::RawHandle,
    pid: ProcessId,
    access: ProcessAccess,
}

impl<'a, A: OsAccess> ProcessHandle<'a, A> {
    /// Open a process with specified access rights
    pub fn open(api: &'a A, pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let raw = api.open_process(pid, access)?;
        Ok(ProcessHandle {
            api,
            raw,
            pid,
            access,
        })
    }

    /// Open a process with the rights a region scan needs
    pub fn open_for_scan(api: &'a A, pid: ProcessId) -> MemoryResult<Self> {
        Self::open(api, pid, ProcessAccess::SCAN)
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Get the access rights
    pub fn access(&self) -> ProcessAccess {
        self.access
    }

    /// Backend this handle was issued by
    pub fn api(&self) -> &'a A {
        self.api
    }

    /// Query the region beginning at or containing `address`
    pub fn query_region(&self, address: Address) -> MemoryResult<Region> {
        self.api.query_region(&self.raw, address)
    }

    /// Read memory from the process
    pub fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        self.api.read_memory(&self.raw, address, buffer)
    }
}

impl<A: OsAccess> fmt::Debug for ProcessHandle<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("backend", &self.api.name())
            .field("pid", &self.pid)
            .field("access", &format!("{}", self.access))
            .finish()
    }
}

impl<A: OsAccess> fmt::Display for ProcessHandle<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessHandle(pid={}, backend={})", self.pid, self.api.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AddressSpaceBounds, MemoryError, ProtectionFlags};
    use crate::os::ScriptedApi;

    fn api() -> ScriptedApi {
        ScriptedApi::new(AddressSpaceBounds::new(
            Address::new(0x1000),
            Address::new(0x4000),
        ))
        .with_process(1234, "target.exe")
        .with_region(
            Region::committed(Address::new(0x1000), 0x1000, ProtectionFlags::read_only()),
            0x11,
        )
    }

    #[test]
    fn test_open_for_scan() {
        let api = api();
        let handle = ProcessHandle::open_for_scan(&api, 1234).unwrap();
        assert_eq!(handle.pid(), 1234);
        assert_eq!(handle.access(), ProcessAccess::SCAN);
    }

    #[test]
    fn test_open_unknown_pid_fails() {
        let api = api();
        let result = ProcessHandle::open_for_scan(&api, 99);
        assert!(matches!(result, Err(MemoryError::OpenFailed { pid: 99, .. })));
    }

    #[test]
    fn test_query_and_read_through_handle() {
        let api = api();
        let handle = ProcessHandle::open_for_scan(&api, 1234).unwrap();

        let region = handle.query_region(Address::new(0x1800)).unwrap();
        assert_eq!(region.base, Address::new(0x1000));

        let mut buffer = [0u8; 8];
        assert_eq!(handle.read_memory(Address::new(0x1000), &mut buffer).unwrap(), 8);
        assert_eq!(buffer, [0x11; 8]);
    }

    #[test]
    fn test_process_handle_display_and_debug() {
        let api = api();
        let handle = ProcessHandle::open(&api, 1234, ProcessAccess::ALL_ACCESS).unwrap();

        let display = format!("{}", handle);
        assert!(display.contains("pid=1234"));
        assert!(display.contains("backend=scripted"));

        let debug = format!("{:?}", handle);
        assert!(debug.contains("ProcessHandle"));
        assert!(debug.contains("0x1FFFFF"));
    }
}
