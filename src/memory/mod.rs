//! Address-space walking and region reads

pub mod bounds;
pub mod reader;
pub mod regions;
pub mod scanner;

pub use bounds::{resolve_bounds, BoundsResolver};
pub use reader::MemoryReader;
pub use regions::{enumerate_regions, is_readable, readable_regions, RegionEnumerator};
pub use scanner::{
    compare_strategies, scan, scan_concurrent, scan_pooled, scan_sequential, ConcurrentScanner, FanOut,
    TimingComparison,
};
