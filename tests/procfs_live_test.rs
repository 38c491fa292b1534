//! Walks of this test process through the live `/proc` backend

#![cfg(target_os = "linux")]

use memwalk::memory::regions::readable_regions;
use memwalk::os::native;
use memwalk::process::enumerate_processes;
use memwalk::{
    enumerate_regions, scan_concurrent, scan_sequential, Address, BoundsResolver, OsAccess,
    ProcessHandle,
};

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_own_process_is_listed() {
    let api = native();
    let pid = std::process::id();
    let processes = enumerate_processes(&api).unwrap();
    let own = processes.iter().find(|p| p.pid == pid).unwrap();
    assert_eq!(own.name, api.executable_name(pid).unwrap());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_walk_own_address_space() {
    let marker = vec![0x7Eu8; 4096];
    let address = Address::new(marker.as_ptr() as usize);

    let api = native();
    let handle = ProcessHandle::open_for_scan(&api, std::process::id()).unwrap();
    let bounds = BoundsResolver::new(&api).resolve().unwrap();

    let regions = enumerate_regions(&handle, bounds).unwrap();
    assert_eq!(regions.iter().map(|r| r.size).sum::<usize>(), bounds.span());
    assert!(regions.windows(2).all(|p| p[0].end() == p[1].base));

    let readable = readable_regions(&regions);
    assert!(readable.iter().any(|r| r.contains(address)));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_scan_own_heap_region() {
    let api = native();
    let handle = ProcessHandle::open_for_scan(&api, std::process::id()).unwrap();

    let marker = vec![0x3Cu8; 8192];
    let address = Address::new(marker.as_ptr() as usize);
    let region = handle.query_region(address).unwrap();

    let sequential = scan_sequential(&handle, &[region]);
    let concurrent = scan_concurrent(&handle, &[region]);
    assert_eq!(sequential.read_count(), 1);
    assert_eq!(concurrent.read_count(), 1);

    let offset = region.base.distance_to(address);
    let bytes = concurrent.outcomes[0].bytes.as_ref().unwrap();
    assert_eq!(&bytes[offset..offset + marker.len()], &marker[..]);
}
