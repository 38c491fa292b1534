//! Readability policy

use memwalk::{is_readable, Address, ProtectionFlags, Region, RegionState};
use proptest::prelude::*;

fn with(state: RegionState, protection: ProtectionFlags) -> Region {
    Region::new(Address::new(0x10000), 0x1000, state, protection)
}

#[test]
fn test_readable_examples() {
    let committed = RegionState::Committed;

    assert!(is_readable(&with(committed, ProtectionFlags::read_only())));
    assert!(is_readable(&with(committed, ProtectionFlags::read_write())));
    assert!(is_readable(&with(committed, ProtectionFlags::execute_read())));
    assert!(is_readable(&with(committed, ProtectionFlags::execute_read_write())));
    assert!(is_readable(&with(
        committed,
        ProtectionFlags::new(ProtectionFlags::READONLY | ProtectionFlags::NOCACHE)
    )));
}

#[test]
fn test_unreadable_examples() {
    let committed = RegionState::Committed;

    assert!(!is_readable(&with(committed, ProtectionFlags::no_access())));
    assert!(!is_readable(&with(committed, ProtectionFlags::read_write().with_guard())));
    assert!(!is_readable(&with(RegionState::Reserved, ProtectionFlags::read_write())));
    assert!(!is_readable(&with(RegionState::Free, ProtectionFlags::read_only())));
    // Execute-only and copy-on-write pages stay unreadable
    assert!(!is_readable(&with(committed, ProtectionFlags::execute())));
    assert!(!is_readable(&with(
        committed,
        ProtectionFlags::new(ProtectionFlags::WRITECOPY)
    )));
}

fn any_state() -> impl Strategy<Value = RegionState> {
    prop_oneof![
        Just(RegionState::Free),
        Just(RegionState::Reserved),
        Just(RegionState::Committed),
    ]
}

proptest! {
    #[test]
    fn prop_classifier_is_pure(state in any_state(), bits in 0u32..0x800, base in any::<usize>(), size in 1usize..0x100000) {
        let region = Region::new(Address::new(base), size, state, ProtectionFlags::new(bits));
        prop_assert_eq!(is_readable(&region), is_readable(&region.clone()));

        let moved = Region::new(Address::new(0x1000), 0x1000, state, ProtectionFlags::new(bits));
        prop_assert_eq!(is_readable(&region), is_readable(&moved));
    }

    #[test]
    fn prop_guard_or_no_access_never_readable(state in any_state(), bits in 0u32..0x800) {
        let guarded = ProtectionFlags::new(bits | ProtectionFlags::GUARD);
        let denied = ProtectionFlags::new(bits | ProtectionFlags::NOACCESS);
        prop_assert!(!is_readable(&with(state, guarded)));
        prop_assert!(!is_readable(&with(state, denied)));
    }
}
