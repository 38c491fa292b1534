//! Readability policy for enumerated regions

use crate::core::types::{Region, RegionState};

/// Decide whether a region is safe and meaningful to read.
///
/// All of the following must hold:
/// 1. the region is committed;
/// 2. its protection carries neither the no-access nor the guard bit;
/// 3. its protection includes read-only, read-write, execute-read or
///    execute-read-write.
///
/// Execute-only and write-copy protections are not treated as readable.
pub fn is_readable(region: &Region) -> bool {
    let protection = region.protection;
    region.state == RegionState::Committed
        && !protection.is_no_access()
        && !protection.is_guard()
        && protection.has_read_access()
}
