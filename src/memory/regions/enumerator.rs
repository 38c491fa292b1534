//! Linear min-to-max walk over a process's address space

use crate::core::types::{
    Address, AddressSpaceBounds, EnumerationError, MemoryError, MemoryResult, Region, RegionList,
};
use crate::os::OsAccess;
use crate::process::ProcessHandle;
use tracing::{debug, trace};

/// Walks regions from `bounds.min` up to `bounds.max`, one OS query per step.
///
/// Each step queries the live target, so regions reflect its layout at query
/// time. The cursor always moves to the end of the region just produced;
/// a region that would not move it forward ends the walk with an error.
/// After the first error the iterator yields nothing further.
pub struct RegionEnumerator<'h, 'a, A: OsAccess> {
    handle: &'h ProcessHandle<'a, A>,
    bounds: AddressSpaceBounds,
    cursor: Address,
    finished: bool,
}

impl<'h, 'a, A: OsAccess> RegionEnumerator<'h, 'a, A> {
    pub fn new(handle: &'h ProcessHandle<'a, A>, bounds: AddressSpaceBounds) -> Self {
        RegionEnumerator {
            handle,
            bounds,
            cursor: bounds.min,
            finished: false,
        }
    }

    /// Address the next query will be issued for
    pub fn cursor(&self) -> Address {
        self.cursor
    }

    fn step(&mut self) -> MemoryResult<Region> {
        let reported = self.handle.query_region(self.cursor)?;
        let region = clamp_region(reported, self.cursor, self.bounds)?;
        trace!(%region, "Region");
        self.cursor = region.end();
        Ok(region)
    }
}

impl<A: OsAccess> Iterator for RegionEnumerator<'_, '_, A> {
    type Item = MemoryResult<Region>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.cursor >= self.bounds.max {
            return None;
        }
        let result = self.step();
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

/// Fit an OS-reported region to the walk.
///
/// The result starts exactly at `cursor` and ends no later than `bounds.max`,
/// so consecutive regions never overlap and together cover `[min, max)`.
fn clamp_region(
    reported: Region,
    cursor: Address,
    bounds: AddressSpaceBounds,
) -> MemoryResult<Region> {
    if reported.size == 0 {
        return Err(MemoryError::zero_size_region(reported.base));
    }
    if !reported.contains(cursor) {
        return Err(MemoryError::NoProgress {
            address: cursor.to_string(),
            reason: format!(
                "reported region {:x}-{:x} does not contain it",
                reported.base,
                reported.end()
            ),
        });
    }

    let end = reported.end().min(bounds.max);
    Ok(Region {
        base: cursor,
        size: cursor.distance_to(end),
        ..reported
    })
}

/// Enumerate every region between the bounds.
///
/// On a failed query or a malformed region the walk stops and the error
/// carries the regions gathered so far; the caller decides whether a partial
/// list is usable. Equal bounds yield an empty list.
pub fn enumerate_regions<A: OsAccess>(
    handle: &ProcessHandle<'_, A>,
    bounds: AddressSpaceBounds,
) -> Result<RegionList, EnumerationError> {
    let mut enumerator = RegionEnumerator::new(handle, bounds);
    let mut regions = RegionList::new();

    while let Some(result) = enumerator.next() {
        match result {
            Ok(region) => regions.push(region),
            Err(source) => {
                return Err(EnumerationError {
                    address: enumerator.cursor(),
                    partial: regions,
                    source,
                })
            }
        }
    }

    debug!(
        pid = handle.pid(),
        count = regions.len(),
        %bounds,
        "Enumerated regions"
    );
    Ok(regions)
}
