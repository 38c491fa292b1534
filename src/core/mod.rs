//! Core module containing the fundamental types of memwalk
//!
//! Everything above the OS boundary speaks in these types: addresses,
//! regions, bounds, read outcomes and scan results.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, AddressSpaceBounds, MemoryError, MemoryResult, ProcessId, Region, RegionList,
    RegionState, ScanResult,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
