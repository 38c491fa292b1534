//! End-to-end walk of one named process: discover, open, enumerate, time

use crate::core::types::{
    AddressSpaceBounds, MemoryError, MemoryResult, ProcessInfo, RegionList,
};
use crate::memory::regions::readable_regions;
use crate::memory::scanner::{compare_strategies, FanOut, TimingComparison};
use crate::memory::{enumerate_regions, BoundsResolver};
use crate::os::OsAccess;
use crate::process::{find_process_by_name, ProcessHandle};
use serde::Serialize;
use tracing::{info, warn};

/// Knobs for a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    pub fan_out: FanOut,
    pub iterations: u32,
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions {
            fan_out: FanOut::Unbounded,
            iterations: 100,
        }
    }
}

/// Everything a walk learned about its target
#[derive(Debug, Clone, Serialize)]
pub struct WalkReport {
    pub process: ProcessInfo,
    pub bounds: AddressSpaceBounds,
    #[serde(skip)]
    pub regions: RegionList,
    pub region_count: usize,
    pub readable_count: usize,
    pub readable_bytes: usize,
    /// Set when enumeration stopped early and `regions` is partial
    pub enumeration_error: Option<String>,
    pub timing: TimingComparison,
}

/// Find `name`, walk its address space and time both scan strategies.
///
/// A missing target is [`MemoryError::ProcessNotFound`]. An enumeration
/// failure is not fatal: the regions gathered before it are still scanned.
pub fn walk<A: OsAccess>(api: &A, name: &str, options: WalkOptions) -> MemoryResult<WalkReport> {
    walk_with(api, name, options, |_| {})
}

/// Same as [`walk`], calling `on_open` once the target handle is open and
/// before any region is queried or read.
pub fn walk_with<A, F>(
    api: &A,
    name: &str,
    options: WalkOptions,
    on_open: F,
) -> MemoryResult<WalkReport>
where
    A: OsAccess,
    F: FnOnce(&ProcessInfo),
{
    let process = find_process_by_name(api, name)?
        .ok_or_else(|| MemoryError::ProcessNotFound(name.to_string()))?;

    let handle = ProcessHandle::open_for_scan(api, process.pid)?;
    info!(pid = process.pid, name = %process.name, "Opened target process");
    on_open(&process);

    let bounds = BoundsResolver::new(api).resolve()?;

    let (regions, enumeration_error) = match enumerate_regions(&handle, bounds) {
        Ok(regions) => (regions, None),
        Err(err) => {
            warn!(error = %err, "Continuing with partial region list");
            let message = err.to_string();
            (err.into_partial(), Some(message))
        }
    };

    let readable = readable_regions(&regions);
    let readable_bytes = readable.iter().map(|r| r.size).sum();
    info!(
        regions = regions.len(),
        readable = readable.len(),
        readable_bytes,
        "Enumerated address space"
    );

    let timing = compare_strategies(&handle, &regions, options.fan_out, options.iterations)?;

    Ok(WalkReport {
        process,
        bounds,
        region_count: regions.len(),
        readable_count: readable.len(),
        readable_bytes,
        regions,
        enumeration_error,
        timing,
    })
}
