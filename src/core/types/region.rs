//! Region metadata: state, protection and address-space bounds

use super::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Allocation state of a memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionState {
    /// Not allocated by the target
    Free,
    /// Address range reserved but without backing storage
    Reserved,
    /// Backing storage assigned
    Committed,
}

impl fmt::Display for RegionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionState::Free => write!(f, "free"),
            RegionState::Reserved => write!(f, "reserved"),
            RegionState::Committed => write!(f, "committed"),
        }
    }
}

/// Page protection bitset.
///
/// Values follow the Windows `PAGE_*` encoding; other backends translate
/// their native permissions into the same bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtectionFlags {
    value: u32,
}

impl ProtectionFlags {
    pub const NOACCESS: u32 = 0x01;
    pub const READONLY: u32 = 0x02;
    pub const READWRITE: u32 = 0x04;
    pub const WRITECOPY: u32 = 0x08;
    pub const EXECUTE: u32 = 0x10;
    pub const EXECUTE_READ: u32 = 0x20;
    pub const EXECUTE_READWRITE: u32 = 0x40;
    pub const EXECUTE_WRITECOPY: u32 = 0x80;
    pub const GUARD: u32 = 0x100;
    pub const NOCACHE: u32 = 0x200;
    pub const WRITECOMBINE: u32 = 0x400;

    /// Protection combinations that grant read access
    pub const READ_CAPABLE: u32 =
        Self::READONLY | Self::READWRITE | Self::EXECUTE_READ | Self::EXECUTE_READWRITE;

    /// Create protection flags from a raw value
    pub const fn new(value: u32) -> Self {
        ProtectionFlags { value }
    }

    /// No protection reported (free or reserved memory)
    pub const fn none() -> Self {
        ProtectionFlags::new(0)
    }

    pub const fn no_access() -> Self {
        ProtectionFlags::new(Self::NOACCESS)
    }

    pub const fn read_only() -> Self {
        ProtectionFlags::new(Self::READONLY)
    }

    pub const fn read_write() -> Self {
        ProtectionFlags::new(Self::READWRITE)
    }

    pub const fn execute() -> Self {
        ProtectionFlags::new(Self::EXECUTE)
    }

    pub const fn execute_read() -> Self {
        ProtectionFlags::new(Self::EXECUTE_READ)
    }

    pub const fn execute_read_write() -> Self {
        ProtectionFlags::new(Self::EXECUTE_READWRITE)
    }

    /// Add guard page flag
    pub const fn with_guard(self) -> Self {
        ProtectionFlags::new(self.value | Self::GUARD)
    }

    /// Check whether any of the given bits are set
    pub const fn intersects(&self, bits: u32) -> bool {
        self.value & bits != 0
    }

    pub const fn is_no_access(&self) -> bool {
        self.intersects(Self::NOACCESS)
    }

    pub const fn is_guard(&self) -> bool {
        self.intersects(Self::GUARD)
    }

    pub const fn is_copy_on_write(&self) -> bool {
        self.intersects(Self::WRITECOPY | Self::EXECUTE_WRITECOPY)
    }

    /// True if one of the read-granting combinations is present
    pub const fn has_read_access(&self) -> bool {
        self.intersects(Self::READ_CAPABLE)
    }

    pub const fn is_writable(&self) -> bool {
        self.intersects(
            Self::READWRITE | Self::WRITECOPY | Self::EXECUTE_READWRITE | Self::EXECUTE_WRITECOPY,
        )
    }

    pub const fn is_executable(&self) -> bool {
        self.intersects(
            Self::EXECUTE | Self::EXECUTE_READ | Self::EXECUTE_READWRITE | Self::EXECUTE_WRITECOPY,
        )
    }

    /// Get the raw protection value
    pub const fn raw(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for ProtectionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.value & 0xFF {
            0 => "---",
            Self::NOACCESS => "NA",
            Self::READONLY => "R",
            Self::READWRITE => "RW",
            Self::WRITECOPY => "WC",
            Self::EXECUTE => "X",
            Self::EXECUTE_READ => "RX",
            Self::EXECUTE_READWRITE => "RWX",
            Self::EXECUTE_WRITECOPY => "WCX",
            _ => "?",
        };
        write!(f, "{}", base)?;
        if self.is_guard() {
            write!(f, "+G")?;
        }
        if self.intersects(Self::NOCACHE) {
            write!(f, "+NC")?;
        }
        Ok(())
    }
}

/// One contiguous span of uniform state and protection, as reported by one OS query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub base: Address,
    pub size: usize,
    pub state: RegionState,
    pub protection: ProtectionFlags,
}

impl Region {
    pub fn new(base: Address, size: usize, state: RegionState, protection: ProtectionFlags) -> Self {
        Region {
            base,
            size,
            state,
            protection,
        }
    }

    /// Committed region with the given protection
    pub fn committed(base: Address, size: usize, protection: ProtectionFlags) -> Self {
        Region::new(base, size, RegionState::Committed, protection)
    }

    /// Free region (no protection)
    pub fn free(base: Address, size: usize) -> Self {
        Region::new(base, size, RegionState::Free, ProtectionFlags::none())
    }

    /// Exclusive end address
    pub fn end(&self) -> Address {
        self.base.saturating_add(self.size)
    }

    pub fn contains(&self, address: Address) -> bool {
        address >= self.base && address < self.end()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:x}-{:x} {:>9} {:<6} {:>12}",
            self.base,
            self.end(),
            self.state,
            self.protection.to_string(),
            self.size
        )
    }
}

/// Ordered, non-overlapping regions covering `[min, max)`
pub type RegionList = Vec<Region>;

/// Lowest and highest addresses any process on this machine may occupy.
/// `max` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSpaceBounds {
    pub min: Address,
    pub max: Address,
}

impl AddressSpaceBounds {
    pub fn new(min: Address, max: Address) -> Self {
        AddressSpaceBounds { min, max }
    }

    /// Total span in bytes
    pub fn span(&self) -> usize {
        self.min.distance_to(self.max)
    }

    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }
}

impl fmt::Display for AddressSpaceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:x}, {:x})", self.min, self.max)
    }
}
