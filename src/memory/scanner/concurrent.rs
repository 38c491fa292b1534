//! Fan-out region reads
//!
//! Two conforming variants: one scoped thread per region (unbounded), or a
//! dedicated rayon pool. Either way every read runs to completion, a failed
//! read never cancels its siblings, and outcomes come back in region order.

use super::FanOut;
use crate::core::types::{MemoryError, MemoryResult, ReadOutcome, Region, ScanResult, ScanStrategy};
use crate::memory::reader::MemoryReader;
use crate::os::OsAccess;
use crate::process::ProcessHandle;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Launch one reader thread per region, then join them all.
///
/// Threads share the handle by reference and each owns its buffer until it is
/// joined. A thread that cannot be spawned or that panics yields a failed
/// outcome for its region only.
pub fn scan_concurrent<A: OsAccess>(handle: &ProcessHandle<'_, A>, regions: &[Region]) -> ScanResult {
    let start = Instant::now();
    let reader = MemoryReader::new(handle);

    let outcomes = thread::scope(|scope| {
        let tasks: Vec<_> = regions
            .iter()
            .map(|region| {
                let reader = &reader;
                let spawned = thread::Builder::new()
                    .name(format!("read-{:x}", region.base.as_usize()))
                    .spawn_scoped(scope, move || reader.read_outcome(region));
                (region, spawned)
            })
            .collect();

        tasks
            .into_iter()
            .map(|(region, spawned)| match spawned {
                Ok(task) => task.join().unwrap_or_else(|_| {
                    warn!(region = %region, "Reader thread panicked");
                    ReadOutcome::failed(
                        *region,
                        MemoryError::read_failed(region.base, "reader thread panicked"),
                    )
                }),
                Err(e) => {
                    warn!(region = %region, error = %e, "Could not spawn reader thread");
                    ReadOutcome::failed(*region, MemoryError::IoError(e))
                }
            })
            .collect::<Vec<_>>()
    });

    finish(regions, outcomes, start)
}

/// Concurrent scanner with its worker threads decided up front.
///
/// A pooled scanner builds its rayon pool once and reuses it for every scan,
/// so repeated scans measure reads rather than pool start-up.
#[derive(Debug)]
pub enum ConcurrentScanner {
    Unbounded,
    Pooled(ThreadPool),
}

impl ConcurrentScanner {
    pub fn new(fan_out: FanOut) -> MemoryResult<Self> {
        match fan_out {
            FanOut::Unbounded => Ok(ConcurrentScanner::Unbounded),
            FanOut::Pooled { threads } => Ok(ConcurrentScanner::Pooled(reader_pool(threads)?)),
        }
    }

    /// Worker count of the pool, `None` for one thread per region
    pub fn threads(&self) -> Option<usize> {
        match self {
            ConcurrentScanner::Unbounded => None,
            ConcurrentScanner::Pooled(pool) => Some(pool.current_num_threads()),
        }
    }

    pub fn scan<A: OsAccess>(&self, handle: &ProcessHandle<'_, A>, regions: &[Region]) -> ScanResult {
        match self {
            ConcurrentScanner::Unbounded => scan_concurrent(handle, regions),
            ConcurrentScanner::Pooled(pool) => scan_on_pool(pool, handle, regions),
        }
    }
}

/// Build the worker pool for pooled scans.
///
/// Zero threads is rejected rather than handed to rayon, which would read it
/// as "pick a default".
fn reader_pool(threads: usize) -> MemoryResult<ThreadPool> {
    if threads == 0 {
        return Err(MemoryError::ThreadPool(
            "pool needs at least one thread".to_string(),
        ));
    }
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("memwalk-reader-{}", i))
        .build()
        .map_err(|e| MemoryError::ThreadPool(e.to_string()))
}

/// Read regions on a fresh pool of `threads` workers.
///
/// Fails only if the pool itself cannot be built.
pub fn scan_pooled<A: OsAccess>(
    handle: &ProcessHandle<'_, A>,
    regions: &[Region],
    threads: usize,
) -> MemoryResult<ScanResult> {
    let pool = reader_pool(threads)?;
    Ok(scan_on_pool(&pool, handle, regions))
}

fn scan_on_pool<A: OsAccess>(
    pool: &ThreadPool,
    handle: &ProcessHandle<'_, A>,
    regions: &[Region],
) -> ScanResult {
    let start = Instant::now();
    let reader = MemoryReader::new(handle);
    let outcomes = pool.install(|| {
        regions
            .par_iter()
            .map(|region| reader.read_outcome(region))
            .collect::<Vec<_>>()
    });

    finish(regions, outcomes, start)
}

fn finish(regions: &[Region], outcomes: Vec<ReadOutcome>, start: Instant) -> ScanResult {
    let result = ScanResult::new(
        ScanStrategy::Concurrent,
        regions.to_vec(),
        outcomes,
        start.elapsed(),
    );
    debug!(
        regions = result.regions.len(),
        read = result.read_count(),
        failed = result.failed_count(),
        elapsed = ?result.elapsed,
        "Concurrent scan finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Address, AddressSpaceBounds, ProtectionFlags};
    use crate::os::{ScriptedApi, ScriptedFault};
    use std::time::Duration;

    fn regions() -> Vec<Region> {
        (0..5)
            .map(|i| {
                Region::committed(
                    Address::new(0x10000 + i * 0x1000),
                    0x1000,
                    ProtectionFlags::read_write(),
                )
            })
            .collect()
    }

    fn api(regions: &[Region]) -> ScriptedApi {
        regions.iter().enumerate().fold(
            ScriptedApi::new(AddressSpaceBounds::new(
                Address::new(0x10000),
                Address::new(0x15000),
            ))
            .with_process(1, "t"),
            |api, (i, r)| api.with_region(*r, i as u8 + 1),
        )
    }

    #[test]
    fn test_one_failure_leaves_siblings_intact() {
        let regions = regions();
        let api = api(&regions).with_read_fault(
            regions[2].base,
            ScriptedFault::Failure("injected".to_string()),
        );
        let handle = ProcessHandle::open_for_scan(&api, 1).unwrap();

        let result = scan_concurrent(&handle, &regions);

        assert_eq!(result.outcomes.len(), 5);
        assert!(result.outcomes[2].is_failed());
        for (i, outcome) in result.outcomes.iter().enumerate().filter(|(i, _)| *i != 2) {
            let bytes = outcome.bytes.as_ref().expect("sibling read should succeed");
            assert!(bytes.iter().all(|&b| b == i as u8 + 1));
        }
    }

    #[test]
    fn test_outcomes_keep_region_order_when_completion_reversed() {
        let regions = regions();
        let api = regions.iter().enumerate().fold(api(&regions), |api, (i, r)| {
            api.with_read_delay(r.base, Duration::from_millis(20 * (5 - i as u64)))
        });
        let handle = ProcessHandle::open_for_scan(&api, 1).unwrap();

        let result = scan_concurrent(&handle, &regions);

        let outcome_order: Vec<Address> = result.outcomes.iter().map(|o| o.region.base).collect();
        let region_order: Vec<Address> = regions.iter().map(|r| r.base).collect();
        assert_eq!(outcome_order, region_order);

        let mut completed = api.completion_order();
        assert_eq!(completed.len(), 5);
        completed.reverse();
        assert_eq!(completed, region_order);
    }

    #[test]
    fn test_pooled_variant_preserves_order() {
        let regions = regions();
        let api = api(&regions).with_read_fault(regions[0].base, ScriptedFault::AccessDenied);
        let handle = ProcessHandle::open_for_scan(&api, 1).unwrap();

        let result = scan_pooled(&handle, &regions, 2).unwrap();

        assert_eq!(result.strategy, ScanStrategy::Concurrent);
        assert!(result.outcomes[0].is_failed());
        assert_eq!(result.read_count(), 4);
        for (outcome, region) in result.outcomes.iter().zip(&regions) {
            assert_eq!(outcome.region, *region);
        }
    }

    #[test]
    fn test_pooled_scanner_reuses_its_pool() {
        let regions = regions();
        let api = api(&regions);
        let handle = ProcessHandle::open_for_scan(&api, 1).unwrap();

        let scanner = ConcurrentScanner::new(FanOut::Pooled { threads: 2 }).unwrap();
        assert_eq!(scanner.threads(), Some(2));
        for _ in 0..3 {
            assert_eq!(scanner.scan(&handle, &regions).read_count(), 5);
        }
        assert_eq!(api.completion_order().len(), 15);
    }

    #[test]
    fn test_zero_thread_pool_rejected() {
        assert!(matches!(
            ConcurrentScanner::new(FanOut::Pooled { threads: 0 }),
            Err(MemoryError::ThreadPool(_))
        ));
        assert_eq!(ConcurrentScanner::new(FanOut::Unbounded).unwrap().threads(), None);
    }

    #[test]
    fn test_empty_region_list() {
        let api = api(&[]);
        let handle = ProcessHandle::open_for_scan(&api, 1).unwrap();
        let result = scan_concurrent(&handle, &[]);
        assert!(result.outcomes.is_empty());
        assert!(result.regions.is_empty());
    }
}
