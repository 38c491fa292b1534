//! memwalk: walk a live process's address space and read its readable regions
//!
//! The walk resolves the machine's application address range, enumerates
//! every region between the bounds, classifies each one as readable or not,
//! and reads the readable ones either one after another or all at once.

pub mod config;
pub mod core;
pub mod memory;
pub mod os;
pub mod process;
pub mod walk;

#[cfg(target_os = "linux")]
pub mod procfs;
#[cfg(windows)]
pub mod windows;

pub use crate::core::types::{
    Address, AddressSpaceBounds, EnumerationError, MemoryError, MemoryResult, ProcessId,
    ProcessInfo, ProtectionFlags, ReadOutcome, Region, RegionList, RegionState, ScanResult,
    ScanStrategy,
};
pub use crate::memory::{
    enumerate_regions, is_readable, scan_concurrent, scan_sequential, BoundsResolver, FanOut,
    MemoryReader,
};
pub use crate::os::{OsAccess, ProcessAccess};
pub use crate::process::{find_process_by_name, ProcessHandle};
pub use crate::walk::{walk, walk_with, WalkOptions, WalkReport};
