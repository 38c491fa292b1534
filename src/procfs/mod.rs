//! Linux backend over `/proc`
//!
//! Regions come from `/proc/<pid>/maps` (unmapped gaps reported as free),
//! bytes from positional reads of `/proc/<pid>/mem`, names from the
//! `/proc/<pid>/exe` link with `/proc/<pid>/comm` as a fallback for kernel
//! threads.

pub mod maps;

use crate::core::types::{
    Address, AddressSpaceBounds, MemoryError, MemoryResult, ProcessId, Region,
};
use crate::os::{OsAccess, ProcessAccess};
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Lowest address used when `vm.mmap_min_addr` cannot be read
pub const DEFAULT_MMAP_MIN_ADDR: usize = 0x10000;

/// End of user space on the common kernel layout for this architecture
#[cfg(target_arch = "x86_64")]
pub const USER_SPACE_END: usize = 0x7fff_ffff_f000;
#[cfg(all(target_pointer_width = "64", not(target_arch = "x86_64")))]
pub const USER_SPACE_END: usize = 0x1_0000_0000_0000;
#[cfg(target_pointer_width = "32")]
pub const USER_SPACE_END: usize = 0xc000_0000;

/// Handle issued by [`ProcfsApi`]
#[derive(Debug)]
pub struct ProcfsHandle {
    pid: ProcessId,
    dir: PathBuf,
    /// Open only when the handle was requested with read rights
    mem: Option<File>,
}

impl ProcfsHandle {
    pub fn pid(&self) -> ProcessId {
        self.pid
    }
}

/// Native Linux backend.
///
/// Holds no cached state: bounds are re-read on each request and callers
/// that want them cached go through [`BoundsResolver`].
///
/// [`BoundsResolver`]: crate::memory::BoundsResolver
#[derive(Debug)]
pub struct ProcfsApi {
    root: PathBuf,
}

impl ProcfsApi {
    /// Backend over the live `/proc`
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Backend over a procfs-shaped directory tree
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        ProcfsApi { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn process_dir(&self, pid: ProcessId) -> PathBuf {
        self.root.join(pid.to_string())
    }

    fn read_bounds(&self) -> MemoryResult<AddressSpaceBounds> {
        // The upper end is fixed per architecture, only the floor is tunable
        let path = self.root.join("sys/vm/mmap_min_addr");
        let min = match fs::read_to_string(&path) {
            Ok(text) => text.trim().parse::<usize>().map_err(|e| {
                MemoryError::BoundsUnavailable(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => DEFAULT_MMAP_MIN_ADDR,
            Err(e) => {
                return Err(MemoryError::BoundsUnavailable(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(AddressSpaceBounds::new(
            Address::new(min),
            Address::new(USER_SPACE_END),
        ))
    }

    fn comm_name(&self, pid: ProcessId) -> MemoryResult<String> {
        fs::read_to_string(self.process_dir(pid).join("comm"))
            .map(|comm| comm.trim_end().to_string())
            .map_err(|e| name_error(pid, e))
    }
}

impl Default for ProcfsApi {
    fn default() -> Self {
        Self::new()
    }
}

fn name_error(pid: ProcessId, err: io::Error) -> MemoryError {
    if err.kind() == ErrorKind::PermissionDenied {
        MemoryError::access_denied(pid, "Access is denied.")
    } else {
        MemoryError::NameResolutionFailed {
            pid,
            reason: err.to_string(),
        }
    }
}

fn open_error(pid: ProcessId, err: io::Error) -> MemoryError {
    match err.kind() {
        ErrorKind::PermissionDenied => MemoryError::access_denied(pid, err.to_string()),
        _ => MemoryError::OpenFailed {
            pid,
            reason: err.to_string(),
        },
    }
}

/// File name of an exe link target, without the `(deleted)` marker
fn exe_base_name(target: &Path) -> Option<String> {
    let name = target.file_name()?.to_string_lossy();
    Some(name.trim_end_matches(" (deleted)").to_string())
}

impl OsAccess for ProcfsApi {
    type RawHandle = ProcfsHandle;

    fn name(&self) -> &'static str {
        "procfs"
    }

    fn list_process_ids(&self) -> MemoryResult<Vec<ProcessId>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            MemoryError::ProcessListFailed(format!("{}: {}", self.root.display(), e))
        })?;

        let mut pids: Vec<ProcessId> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn executable_name(&self, pid: ProcessId) -> MemoryResult<String> {
        match fs::read_link(self.process_dir(pid).join("exe")) {
            Ok(target) => exe_base_name(&target).ok_or_else(|| MemoryError::NameResolutionFailed {
                pid,
                reason: format!("unexpected exe link {}", target.display()),
            }),
            // Kernel threads have no executable
            Err(e) if e.kind() == ErrorKind::NotFound => self.comm_name(pid),
            Err(e) => Err(name_error(pid, e)),
        }
    }

    fn open_process(&self, pid: ProcessId, access: ProcessAccess) -> MemoryResult<ProcfsHandle> {
        let dir = self.process_dir(pid);
        fs::metadata(&dir).map_err(|e| open_error(pid, e))?;

        let mem = if access.contains(ProcessAccess::VM_READ) {
            Some(File::open(dir.join("mem")).map_err(|e| open_error(pid, e))?)
        } else {
            None
        };

        Ok(ProcfsHandle { pid, dir, mem })
    }

    fn address_space_bounds(&self) -> MemoryResult<AddressSpaceBounds> {
        self.read_bounds()
    }

    /// Re-reads the whole maps file on every call so each answer reflects the
    /// target's layout at query time, the way `VirtualQueryEx` does. A full
    /// walk is therefore quadratic in the number of mappings.
    fn query_region(&self, handle: &ProcfsHandle, address: Address) -> MemoryResult<Region> {
        let text = fs::read_to_string(handle.dir.join("maps"))
            .map_err(|e| MemoryError::query_failed(address, e.to_string()))?;
        let entries = maps::parse_maps(&text)
            .map_err(|e| MemoryError::query_failed(address, e.to_string()))?;

        let region = maps::region_at(&entries, address, Address::new(USER_SPACE_END));
        trace!(pid = handle.pid, %address, %region, "Queried region");
        Ok(region)
    }

    fn read_memory(
        &self,
        handle: &ProcfsHandle,
        address: Address,
        buffer: &mut [u8],
    ) -> MemoryResult<usize> {
        let mem = handle.mem.as_ref().ok_or_else(|| {
            MemoryError::InvalidHandle(format!("PID {} was opened without read access", handle.pid))
        })?;

        let mut filled = 0;
        while filled < buffer.len() {
            let offset = (address.as_usize() + filled) as u64;
            match mem.read_at(&mut buffer[filled..], offset) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if filled == 0 => {
                    return Err(match e.kind() {
                        ErrorKind::PermissionDenied => {
                            MemoryError::access_denied(handle.pid, e.to_string())
                        }
                        _ => MemoryError::read_failed(address, e.to_string()),
                    })
                }
                // Report what was copied; the caller decides whether a short read is fatal
                Err(_) => break,
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ProtectionFlags, RegionState};
    use crate::memory::BoundsResolver;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    /// procfs-shaped tree with an init process, a kernel thread and one scannable process
    fn fake_root() -> TempDir {
        let root = TempDir::new().unwrap();
        let path = root.path();

        fs::create_dir_all(path.join("sys/vm")).unwrap();
        fs::write(path.join("sys/vm/mmap_min_addr"), "4096\n").unwrap();

        fs::create_dir(path.join("1")).unwrap();
        symlink("/usr/lib/systemd/systemd", path.join("1/exe")).unwrap();

        fs::create_dir(path.join("2")).unwrap();
        fs::write(path.join("2/comm"), "kthreadd\n").unwrap();

        fs::create_dir(path.join("42")).unwrap();
        symlink("/opt/app/target (deleted)", path.join("42/exe")).unwrap();
        fs::write(
            path.join("42/maps"),
            "1000-3000 rw-p 00000000 00:00 0\n3000-4000 ---p 00000000 00:00 0\n",
        )
        .unwrap();
        let mem: Vec<u8> = (0..0x4000usize).map(|i| (i / 0x1000) as u8).collect();
        fs::write(path.join("42/mem"), mem).unwrap();

        fs::create_dir(path.join("net")).unwrap();
        root
    }

    #[test]
    fn test_list_and_names() {
        let root = fake_root();
        let api = ProcfsApi::with_root(root.path());

        assert_eq!(api.list_process_ids().unwrap(), vec![1, 2, 42]);
        assert_eq!(api.executable_name(1).unwrap(), "systemd");
        assert_eq!(api.executable_name(2).unwrap(), "kthreadd");
        assert_eq!(api.executable_name(42).unwrap(), "target");
        assert!(matches!(
            api.executable_name(7),
            Err(MemoryError::NameResolutionFailed { pid: 7, .. })
        ));
    }

    #[test]
    fn test_bounds_from_mmap_min_addr() {
        let root = fake_root();
        let api = ProcfsApi::with_root(root.path());
        let bounds = api.address_space_bounds().unwrap();
        assert_eq!(bounds.min, Address::new(0x1000));
        assert_eq!(bounds.max, Address::new(USER_SPACE_END));

        let empty = TempDir::new().unwrap();
        let api = ProcfsApi::with_root(empty.path());
        assert_eq!(
            api.address_space_bounds().unwrap().min,
            Address::new(DEFAULT_MMAP_MIN_ADDR)
        );
    }

    #[test]
    fn test_bounds_cached_only_by_resolver() {
        let root = fake_root();
        let api = ProcfsApi::with_root(root.path());
        let resolver = BoundsResolver::new(&api);
        assert_eq!(resolver.resolve().unwrap().min, Address::new(0x1000));

        fs::write(root.path().join("sys/vm/mmap_min_addr"), "65536\n").unwrap();
        assert_eq!(api.address_space_bounds().unwrap().min, Address::new(0x10000));
        assert_eq!(resolver.resolve().unwrap().min, Address::new(0x1000));
    }

    #[test]
    fn test_query_sees_live_layout() {
        let root = fake_root();
        let api = ProcfsApi::with_root(root.path());
        let handle = api.open_process(42, ProcessAccess::SCAN).unwrap();

        let before = api.query_region(&handle, Address::new(0x5000)).unwrap();
        assert_eq!(before.state, RegionState::Free);

        fs::write(
            root.path().join("42/maps"),
            "1000-3000 rw-p 00000000 00:00 0\n5000-6000 r--p 00000000 00:00 0\n",
        )
        .unwrap();
        let after = api.query_region(&handle, Address::new(0x5000)).unwrap();
        assert_eq!(after.state, RegionState::Committed);
        assert_eq!(after.protection, ProtectionFlags::read_only());
    }

    #[test]
    fn test_query_and_read_fake_process() {
        let root = fake_root();
        let api = ProcfsApi::with_root(root.path());
        let handle = api.open_process(42, ProcessAccess::SCAN).unwrap();

        let region = api.query_region(&handle, Address::new(0x2000)).unwrap();
        assert_eq!(region.base, Address::new(0x1000));
        assert_eq!(region.size, 0x2000);
        assert_eq!(region.protection, ProtectionFlags::read_write());

        let guard = api.query_region(&handle, Address::new(0x3000)).unwrap();
        assert_eq!(guard.protection, ProtectionFlags::no_access());

        let tail = api.query_region(&handle, Address::new(0x4000)).unwrap();
        assert_eq!(tail.state, RegionState::Free);

        let mut buffer = [0u8; 16];
        assert_eq!(api.read_memory(&handle, Address::new(0x2000), &mut buffer).unwrap(), 16);
        assert_eq!(buffer, [2u8; 16]);

        // Short read at the end of the backing file
        assert_eq!(api.read_memory(&handle, Address::new(0x3ff8), &mut buffer).unwrap(), 8);
    }

    #[test]
    fn test_open_failures() {
        let root = fake_root();
        let api = ProcfsApi::with_root(root.path());

        assert!(matches!(
            api.open_process(99, ProcessAccess::SCAN),
            Err(MemoryError::OpenFailed { pid: 99, .. })
        ));

        // Process without a mem file can still be opened for queries only
        let handle = api.open_process(1, ProcessAccess::QUERY_INFORMATION).unwrap();
        let mut buffer = [0u8; 4];
        assert!(matches!(
            api.read_memory(&handle, Address::new(0x1000), &mut buffer),
            Err(MemoryError::InvalidHandle(_))
        ));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_read_own_memory() {
        let api = ProcfsApi::new();
        let handle = api
            .open_process(std::process::id(), ProcessAccess::SCAN)
            .unwrap();

        let marker = vec![0xC3u8; 256];
        let address = Address::new(marker.as_ptr() as usize);

        let region = api.query_region(&handle, address).unwrap();
        assert!(region.contains(address));
        assert_eq!(region.state, RegionState::Committed);

        let mut buffer = vec![0u8; 256];
        assert_eq!(api.read_memory(&handle, address, &mut buffer).unwrap(), 256);
        assert_eq!(buffer, marker);
    }
}
