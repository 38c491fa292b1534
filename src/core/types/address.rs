//! Virtual address wrapper used for region bases and cursor positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// An address in the target process's virtual address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// Advances the address by `bytes`, clamping at `usize::MAX`
    pub const fn saturating_add(&self, bytes: usize) -> Self {
        Address(self.0.saturating_add(bytes))
    }

    /// Number of bytes from `self` up to `end` (zero if `end` is not above `self`)
    pub const fn distance_to(&self, end: Address) -> usize {
        end.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_add() {
        assert_eq!(Address::new(0x1000).saturating_add(0x10), Address::new(0x1010));
        assert_eq!(
            Address::new(usize::MAX - 1).saturating_add(8),
            Address::new(usize::MAX)
        );
    }

    #[test]
    fn test_distance_to() {
        let start = Address::new(0x1000);
        assert_eq!(start.distance_to(Address::new(0x3000)), 0x2000);
        assert_eq!(start.distance_to(Address::new(0x1000)), 0);
        assert_eq!(start.distance_to(Address::new(0x0800)), 0);
    }

    #[test]
    fn test_address_display() {
        let addr = Address::new(0xDEADBEEF);
        assert_eq!(format!("{}", addr), "0x00000000DEADBEEF");
        assert_eq!(format!("{:x}", addr), "0x00000000deadbeef");
    }
}
