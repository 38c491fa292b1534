//! Memory region information wrapper

use crate::core::types::{Address, ProtectionFlags, Region, RegionState};
use winapi::um::winnt::MEMORY_BASIC_INFORMATION;

pub const MEM_COMMIT: u32 = 0x1000;
pub const MEM_RESERVE: u32 = 0x2000;
pub const MEM_FREE: u32 = 0x10000;

/// Wrapper for MEMORY_BASIC_INFORMATION
#[derive(Debug, Clone)]
pub struct MemoryBasicInfo {
    pub base_address: Address,
    pub region_size: usize,
    pub state: u32,
    pub protect: u32,
}

impl From<MEMORY_BASIC_INFORMATION> for MemoryBasicInfo {
    fn from(mbi: MEMORY_BASIC_INFORMATION) -> Self {
        MemoryBasicInfo {
            base_address: Address::new(mbi.BaseAddress as usize),
            region_size: mbi.RegionSize,
            state: mbi.State,
            protect: mbi.Protect,
        }
    }
}

impl MemoryBasicInfo {
    /// Region state; anything the OS reports besides commit or reserve is free
    pub fn region_state(&self) -> RegionState {
        match self.state {
            MEM_COMMIT => RegionState::Committed,
            MEM_RESERVE => RegionState::Reserved,
            _ => RegionState::Free,
        }
    }

    /// Convert to a [`Region`]. The `PAGE_*` bits map onto [`ProtectionFlags`] unchanged.
    pub fn to_region(&self) -> Region {
        let protection = match self.region_state() {
            RegionState::Free => ProtectionFlags::none(),
            _ => ProtectionFlags::new(self.protect),
        };
        Region::new(
            self.base_address,
            self.region_size,
            self.region_state(),
            protection,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    fn mbi(base: usize, size: usize, state: u32, protect: u32) -> MEMORY_BASIC_INFORMATION {
        let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { mem::zeroed() };
        mbi.BaseAddress = base as *mut _;
        mbi.AllocationBase = base as *mut _;
        mbi.RegionSize = size;
        mbi.State = state;
        mbi.Protect = protect;
        mbi
    }

    #[test]
    fn test_committed_region() {
        let info = MemoryBasicInfo::from(mbi(0x2000, 0x3000, MEM_COMMIT, 0x20));
        let region = info.to_region();
        assert_eq!(region.base, Address::new(0x2000));
        assert_eq!(region.size, 0x3000);
        assert_eq!(region.state, RegionState::Committed);
        assert_eq!(region.protection, ProtectionFlags::execute_read());
    }

    #[test]
    fn test_reserved_and_free_states() {
        let reserved = MemoryBasicInfo::from(mbi(0x1000, 0x1000, MEM_RESERVE, 0));
        assert_eq!(reserved.region_state(), RegionState::Reserved);

        let free = MemoryBasicInfo::from(mbi(0x1000, 0x1000, MEM_FREE, 0x01));
        let region = free.to_region();
        assert_eq!(region.state, RegionState::Free);
        assert_eq!(region.protection, ProtectionFlags::none());
    }

    #[test]
    fn test_guard_bit_preserved() {
        let info = MemoryBasicInfo::from(mbi(0x1000, 0x1000, MEM_COMMIT, 0x104));
        assert!(info.to_region().protection.is_guard());
    }
}
