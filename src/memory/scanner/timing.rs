//! Repeated-scan timing for comparing the two strategies

use super::{scan_sequential, ConcurrentScanner, FanOut};
use crate::core::types::{MemoryResult, Region, ScanStrategy, ScanSummary};
use crate::os::OsAccess;
use crate::process::ProcessHandle;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Aggregate wall-clock time of repeated scans with one strategy
#[derive(Debug, Clone, Serialize)]
pub struct ScanTiming {
    pub strategy: ScanStrategy,
    pub iterations: u32,
    pub elapsed: Duration,
    /// Counters from the final iteration
    pub last: Option<ScanSummary>,
}

impl ScanTiming {
    /// Mean duration of one iteration
    pub fn per_iteration(&self) -> Duration {
        if self.iterations == 0 {
            Duration::ZERO
        } else {
            self.elapsed / self.iterations
        }
    }
}

/// Sequential and concurrent timings over the same region list
#[derive(Debug, Clone, Serialize)]
pub struct TimingComparison {
    pub sequential: ScanTiming,
    pub concurrent: ScanTiming,
}

impl TimingComparison {
    /// Sequential time divided by concurrent time
    pub fn speedup(&self) -> Option<f64> {
        let concurrent = self.concurrent.elapsed.as_secs_f64();
        (concurrent > 0.0).then(|| self.sequential.elapsed.as_secs_f64() / concurrent)
    }
}

/// Run `strategy` `iterations` times over `regions` and measure the total.
///
/// A worker pool is built once, before the clock starts.
pub fn time_strategy<A: OsAccess>(
    handle: &ProcessHandle<'_, A>,
    regions: &[Region],
    strategy: ScanStrategy,
    fan_out: FanOut,
    iterations: u32,
) -> MemoryResult<ScanTiming> {
    let concurrent = match strategy {
        ScanStrategy::Sequential => None,
        ScanStrategy::Concurrent => Some(ConcurrentScanner::new(fan_out)?),
    };

    let mut last = None;
    let start = Instant::now();
    for _ in 0..iterations {
        let result = match &concurrent {
            Some(scanner) => scanner.scan(handle, regions),
            None => scan_sequential(handle, regions),
        };
        last = Some(result.summary());
    }
    let elapsed = start.elapsed();

    info!(%strategy, iterations, ?elapsed, "Timed repeated scans");
    Ok(ScanTiming {
        strategy,
        iterations,
        elapsed,
        last,
    })
}

/// Time both strategies back to back
pub fn compare_strategies<A: OsAccess>(
    handle: &ProcessHandle<'_, A>,
    regions: &[Region],
    fan_out: FanOut,
    iterations: u32,
) -> MemoryResult<TimingComparison> {
    Ok(TimingComparison {
        sequential: time_strategy(handle, regions, ScanStrategy::Sequential, fan_out, iterations)?,
        concurrent: time_strategy(handle, regions, ScanStrategy::Concurrent, fan_out, iterations)?,
    })
}
