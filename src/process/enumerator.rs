//! Process discovery by executable name

use crate::core::types::{MemoryResult, ProcessId, ProcessInfo};
use crate::os::OsAccess;
use std::vec;
use tracing::{debug, warn};

/// Walks a snapshot of process identifiers, resolving each one's name lazily.
///
/// Name resolution is fallible per process (stale id, access denied); each
/// item carries its own result so a single failure never ends the walk.
pub struct ProcessEnumerator<'a, A: OsAccess> {
    api: &'a A,
    pids: vec::IntoIter<ProcessId>,
}

impl<'a, A: OsAccess> ProcessEnumerator<'a, A> {
    /// Snapshot the live process ids
    pub fn new(api: &'a A) -> MemoryResult<Self> {
        let pids = api.list_process_ids()?;
        debug!(count = pids.len(), "Listed process ids");
        Ok(ProcessEnumerator {
            api,
            pids: pids.into_iter(),
        })
    }
}

impl<A: OsAccess> Iterator for ProcessEnumerator<'_, A> {
    type Item = (ProcessId, MemoryResult<ProcessInfo>);

    fn next(&mut self) -> Option<Self::Item> {
        let pid = self.pids.next()?;
        let info = self
            .api
            .executable_name(pid)
            .map(|name| ProcessInfo::new(pid, name));
        Some((pid, info))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pids.size_hint()
    }
}

/// Enumerate every process whose name could be resolved
pub fn enumerate_processes<A: OsAccess>(api: &A) -> MemoryResult<Vec<ProcessInfo>> {
    Ok(ProcessEnumerator::new(api)?
        .filter_map(|(_, info)| info.ok())
        .collect())
}

/// Find the process whose executable name equals `name`.
///
/// Every process in the snapshot is examined; when several share the name
/// the last one listed wins. Returns `Ok(None)` when nothing matched, and
/// `Err` only when the process list itself could not be obtained. Per-process
/// name failures are logged and skipped: the idle process and access-denied
/// failures quietly, anything else as a warning.
pub fn find_process_by_name<A: OsAccess>(api: &A, name: &str) -> MemoryResult<Option<ProcessInfo>> {
    let mut found = None;
    for (pid, info) in ProcessEnumerator::new(api)? {
        match info {
            Ok(info) if info.name_matches(name) => {
                debug!(pid, name = %info.name, "Matched target process");
                found = Some(info);
            }
            Ok(_) => {}
            Err(e) if pid == 0 || e.is_access_denied() => {
                debug!(pid, error = %e, "Skipping inaccessible process");
            }
            Err(e) => {
                warn!(pid, error = %e, "Failed to resolve process name");
            }
        }
    }
    Ok(found)
}
