//! Memory region walking and classification
//!
//! Enumerates the regions of a target process between the address-space
//! bounds and decides which of them are worth reading.

pub mod classifier;
pub mod enumerator;

pub use classifier::is_readable;
pub use enumerator::{enumerate_regions, RegionEnumerator};

use crate::core::types::Region;

/// Keep only the regions the classifier accepts
pub fn readable_regions(regions: &[Region]) -> Vec<Region> {
    regions.iter().filter(|r| is_readable(r)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Address, ProtectionFlags, RegionState};

    #[test]
    fn test_readable_regions_filter() {
        let regions = vec![
            Region::committed(Address::new(0x1000), 0x1000, ProtectionFlags::read_only()),
            Region::committed(Address::new(0x2000), 0x1000, ProtectionFlags::no_access()),
            Region::new(
                Address::new(0x3000),
                0x1000,
                RegionState::Reserved,
                ProtectionFlags::read_write(),
            ),
        ];
        let readable = readable_regions(&regions);
        assert_eq!(readable.len(), 1);
        assert_eq!(readable[0].base, Address::new(0x1000));
    }
}
