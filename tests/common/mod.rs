//! Shared fixtures for integration tests

#![allow(dead_code)]

use memwalk::os::ScriptedApi;
use memwalk::{Address, AddressSpaceBounds, ProtectionFlags, Region};

pub const TARGET_PID: u32 = 100;
pub const TARGET_NAME: &str = "target.exe";

pub fn bounds(min: usize, max: usize) -> AddressSpaceBounds {
    AddressSpaceBounds::new(Address::new(min), Address::new(max))
}

pub fn region(base: usize, size: usize, protection: ProtectionFlags) -> Region {
    Region::committed(Address::new(base), size, protection)
}

/// Scripted target with the given regions; each region reads back as its index
pub fn scripted(bounds: AddressSpaceBounds, regions: &[Region]) -> ScriptedApi {
    regions.iter().enumerate().fold(
        ScriptedApi::new(bounds).with_process(TARGET_PID, TARGET_NAME),
        |api, (i, r)| api.with_region(*r, i as u8),
    )
}

/// Five adjacent readable regions of 0x1000 bytes starting at 0x10000
pub fn five_readable() -> Vec<Region> {
    (0..5)
        .map(|i| region(0x10000 + i * 0x1000, 0x1000, ProtectionFlags::read_write()))
        .collect()
}
