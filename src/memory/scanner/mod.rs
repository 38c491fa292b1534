//! Scan strategies: read every region of a [`RegionList`] sequentially or
//! concurrently, and time the two against each other.
//!
//! [`RegionList`]: crate::core::types::RegionList

pub mod concurrent;
pub mod sequential;
pub mod timing;

pub use concurrent::{scan_concurrent, scan_pooled, ConcurrentScanner};
pub use sequential::scan_sequential;
pub use timing::{compare_strategies, time_strategy, ScanTiming, TimingComparison};

use crate::core::types::{MemoryResult, Region, ScanResult, ScanStrategy};
use crate::os::OsAccess;
use crate::process::ProcessHandle;

/// How the concurrent strategy spreads reads over threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// One thread per region
    Unbounded,
    /// Fixed-size worker pool
    Pooled { threads: usize },
}

/// Run one scan with the requested strategy
pub fn scan<A: OsAccess>(
    handle: &ProcessHandle<'_, A>,
    regions: &[Region],
    strategy: ScanStrategy,
    fan_out: FanOut,
) -> MemoryResult<ScanResult> {
    match (strategy, fan_out) {
        (ScanStrategy::Sequential, _) => Ok(scan_sequential(handle, regions)),
        (ScanStrategy::Concurrent, fan_out) => {
            Ok(ConcurrentScanner::new(fan_out)?.scan(handle, regions))
        }
    }
}
