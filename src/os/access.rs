//! Process access rights requested when opening a handle

use std::fmt;
use std::ops::BitOr;

/// Access rights for process handles (Windows `PROCESS_*` encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessAccess {
    value: u32,
}

impl ProcessAccess {
    /// All possible access rights
    pub const ALL_ACCESS: Self = Self { value: 0x1FFFFF };
    /// Query information access
    pub const QUERY_INFORMATION: Self = Self { value: 0x0400 };
    /// Limited query access, enough to resolve the image name
    pub const QUERY_LIMITED_INFORMATION: Self = Self { value: 0x1000 };
    /// Read memory access
    pub const VM_READ: Self = Self { value: 0x0010 };
    /// Write memory access
    pub const VM_WRITE: Self = Self { value: 0x0020 };
    /// Execute operations
    pub const VM_OPERATION: Self = Self { value: 0x0008 };

    /// Rights needed to walk regions and read their bytes
    pub const SCAN: Self = Self {
        value: Self::QUERY_INFORMATION.value | Self::VM_READ.value,
    };

    /// Rights needed to resolve an executable name
    pub const NAME_QUERY: Self = Self {
        value: Self::QUERY_INFORMATION.value | Self::QUERY_LIMITED_INFORMATION.value,
    };

    /// Combine access rights
    pub fn combine(rights: &[Self]) -> Self {
        let value = rights.iter().fold(0, |acc, right| acc | right.value);
        Self { value }
    }

    /// Check that every right in `other` is present
    pub fn contains(&self, other: Self) -> bool {
        self.value & other.value == other.value
    }

    /// Get raw value
    pub fn value(&self) -> u32 {
        self.value
    }
}

impl BitOr for ProcessAccess {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            value: self.value | rhs.value,
        }
    }
}

impl fmt::Display for ProcessAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.value)
    }
}
