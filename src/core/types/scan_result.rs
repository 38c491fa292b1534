//! Per-region read outcomes and aggregate scan results

use super::{MemoryError, Region, RegionList};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Which orchestration produced a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStrategy {
    Sequential,
    Concurrent,
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStrategy::Sequential => write!(f, "Sequential"),
            ScanStrategy::Concurrent => write!(f, "Concurrent"),
        }
    }
}

/// Result of one attempted region read.
///
/// `bytes` is `None` when the region was skipped as unreadable (and `error`
/// is `None` too) or when the read failed (and `error` holds the cause).
#[derive(Debug)]
pub struct ReadOutcome {
    pub region: Region,
    pub bytes: Option<Vec<u8>>,
    pub error: Option<MemoryError>,
}

impl ReadOutcome {
    pub fn skipped(region: Region) -> Self {
        ReadOutcome {
            region,
            bytes: None,
            error: None,
        }
    }

    pub fn read(region: Region, bytes: Vec<u8>) -> Self {
        ReadOutcome {
            region,
            bytes: Some(bytes),
            error: None,
        }
    }

    pub fn failed(region: Region, error: MemoryError) -> Self {
        ReadOutcome {
            region,
            bytes: None,
            error: Some(error),
        }
    }

    pub fn is_present(&self) -> bool {
        self.bytes.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_skipped(&self) -> bool {
        self.bytes.is_none() && self.error.is_none()
    }
}

/// Aggregate output of one walk-and-read pass
#[derive(Debug)]
pub struct ScanResult {
    pub strategy: ScanStrategy,
    pub regions: RegionList,
    /// One outcome per region, in region order
    pub outcomes: Vec<ReadOutcome>,
    pub elapsed: Duration,
}

impl ScanResult {
    pub fn new(
        strategy: ScanStrategy,
        regions: RegionList,
        outcomes: Vec<ReadOutcome>,
        elapsed: Duration,
    ) -> Self {
        ScanResult {
            strategy,
            regions,
            outcomes,
            elapsed,
        }
    }

    /// Number of regions whose bytes were captured
    pub fn read_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_present()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    /// Total bytes captured across all regions
    pub fn bytes_read(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.bytes.as_ref())
            .map(Vec::len)
            .sum()
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            strategy: self.strategy,
            regions: self.regions.len(),
            read: self.read_count(),
            failed: self.failed_count(),
            skipped: self.skipped_count(),
            bytes_read: self.bytes_read(),
            elapsed_ms: self.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Serializable counters for a [`ScanResult`]
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub strategy: ScanStrategy,
    pub regions: usize,
    pub read: usize,
    pub failed: usize,
    pub skipped: usize,
    pub bytes_read: usize,
    pub elapsed_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Address, ProtectionFlags};

    fn region(base: usize) -> Region {
        Region::committed(Address::new(base), 0x10, ProtectionFlags::read_only())
    }

    #[test]
    fn test_outcome_kinds() {
        assert!(ReadOutcome::skipped(region(0x1000)).is_skipped());
        assert!(ReadOutcome::read(region(0x1000), vec![0; 16]).is_present());

        let failed = ReadOutcome::failed(region(0x1000), MemoryError::read_failed("0x1000", "x"));
        assert!(failed.is_failed());
        assert!(!failed.is_present());
        assert!(!failed.is_skipped());
    }

    #[test]
    fn test_scan_result_counters() {
        let regions = vec![region(0x1000), region(0x1010), region(0x1020)];
        let outcomes = vec![
            ReadOutcome::read(regions[0], vec![1; 16]),
            ReadOutcome::skipped(regions[1]),
            ReadOutcome::failed(regions[2], MemoryError::read_failed("0x1020", "denied")),
        ];
        let result = ScanResult::new(
            ScanStrategy::Sequential,
            regions,
            outcomes,
            Duration::from_millis(5),
        );

        assert_eq!(result.read_count(), 1);
        assert_eq!(result.skipped_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.bytes_read(), 16);

        let summary = result.summary();
        assert_eq!(summary.regions, 3);
        assert_eq!(summary.elapsed_ms, 5.0);
    }
}
