//! One-at-a-time region reads in address order

use crate::core::types::{Region, ScanResult, ScanStrategy};
use crate::memory::reader::MemoryReader;
use crate::os::OsAccess;
use crate::process::ProcessHandle;
use std::time::Instant;
use tracing::debug;

/// Read every readable region in list order, blocking on each read.
///
/// A failed read is recorded in that region's outcome and the walk moves on.
pub fn scan_sequential<A: OsAccess>(handle: &ProcessHandle<'_, A>, regions: &[Region]) -> ScanResult {
    let start = Instant::now();
    let reader = MemoryReader::new(handle);

    let outcomes = regions.iter().map(|r| reader.read_outcome(r)).collect();

    let result = ScanResult::new(
        ScanStrategy::Sequential,
        regions.to_vec(),
        outcomes,
        start.elapsed(),
    );
    debug!(
        read = result.read_count(),
        failed = result.failed_count(),
        elapsed = ?result.elapsed,
        "Sequential scan finished"
    );
    result
}
