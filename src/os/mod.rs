//! OS-access abstraction
//!
//! Every primitive the walker needs from the operating system goes through
//! [`OsAccess`]. Platform backends (`crate::windows`, `crate::procfs`) own
//! all unsafe marshaling; [`scripted::ScriptedApi`] is an in-memory backend
//! used by tests and benchmarks.

pub mod access;
pub mod scripted;

pub use access::ProcessAccess;
pub use scripted::{ScriptedApi, ScriptedFault};

use crate::core::types::{Address, AddressSpaceBounds, MemoryResult, ProcessId, Region};

/// Typed access to process discovery, region queries and memory reads.
///
/// Implementations are shared by reference across reader threads, so both the
/// backend and its raw handles must be `Send + Sync`. Every method only
/// performs read-only OS calls.
pub trait OsAccess: Send + Sync {
    /// Opaque OS handle bound to one process
    type RawHandle: Send + Sync;

    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Identifiers of every live process
    fn list_process_ids(&self) -> MemoryResult<Vec<ProcessId>>;

    /// Base file name of a process's executable
    fn executable_name(&self, pid: ProcessId) -> MemoryResult<String>;

    /// Open a handle with the requested rights
    fn open_process(&self, pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self::RawHandle>;

    /// Machine-wide application address range; `max` is exclusive
    fn address_space_bounds(&self) -> MemoryResult<AddressSpaceBounds>;

    /// Metadata for the region beginning at or containing `address`
    fn query_region(&self, handle: &Self::RawHandle, address: Address) -> MemoryResult<Region>;

    /// Copy bytes starting at `address` into `buffer`, returning the count copied
    fn read_memory(
        &self,
        handle: &Self::RawHandle,
        address: Address,
        buffer: &mut [u8],
    ) -> MemoryResult<usize>;
}

#[cfg(windows)]
pub type NativeApi = crate::windows::WindowsApi;

#[cfg(target_os = "linux")]
pub type NativeApi = crate::procfs::ProcfsApi;

/// Backend for the platform this binary was built for
#[cfg(any(windows, target_os = "linux"))]
pub fn native() -> NativeApi {
    NativeApi::new()
}

/// True when this build has a native backend
pub const fn has_native_backend() -> bool {
    cfg!(any(windows, target_os = "linux"))
}
