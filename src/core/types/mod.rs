//! Core type definitions for memwalk
//!
//! Addresses, region metadata, read outcomes, scan results and the
//! error types shared by every layer of the walker.

mod address;
mod error;
mod process_info;
mod region;
mod scan_result;

// Re-export all public types
pub use address::Address;
pub use error::{EnumerationError, MemoryError, MemoryResult};
pub use process_info::ProcessInfo;
pub use region::{AddressSpaceBounds, ProtectionFlags, Region, RegionList, RegionState};
pub use scan_result::{ReadOutcome, ScanResult, ScanStrategy, ScanSummary};

pub type ProcessId = u32;
