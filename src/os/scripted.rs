//! In-memory [`OsAccess`] backend driven by a fixed script
//!
//! Regions, processes and failures are declared up front. Queries behave
//! like `VirtualQueryEx`: an address inside a scripted region reports that
//! region, any other address reports a free span running up to the next
//! scripted region (or the upper bound). Reads fill the buffer with each
//! region's fill byte.

use super::{OsAccess, ProcessAccess};
use crate::core::types::{
    Address, AddressSpaceBounds, MemoryError, MemoryResult, ProcessId, Region,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Failure injected into a scripted call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFault {
    /// Surfaces as [`MemoryError::AccessDenied`]
    AccessDenied,
    /// Surfaces as a backend-specific failure with this reason
    Failure(String),
}

impl ScriptedFault {
    fn for_read(&self, pid: ProcessId, address: Address) -> MemoryError {
        match self {
            ScriptedFault::AccessDenied => MemoryError::access_denied(pid, "scripted denial"),
            ScriptedFault::Failure(reason) => MemoryError::read_failed(address, reason.clone()),
        }
    }
}

#[derive(Debug, Clone)]
struct ScriptedRegion {
    region: Region,
    fill: u8,
    read_fault: Option<ScriptedFault>,
    read_delay: Duration,
}

/// Handle issued by [`ScriptedApi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedHandle {
    pub pid: ProcessId,
    pub access: ProcessAccess,
}

/// Scripted backend for tests and benchmarks
#[derive(Debug)]
pub struct ScriptedApi {
    bounds: AddressSpaceBounds,
    regions: Vec<ScriptedRegion>,
    processes: Vec<(ProcessId, String)>,
    name_faults: HashMap<ProcessId, ScriptedFault>,
    open_denied: HashSet<ProcessId>,
    query_faults: HashSet<Address>,
    listing_fault: Option<String>,
    bounds_fault: Option<String>,
    bounds_queries: AtomicUsize,
    region_queries: AtomicUsize,
    completions: Mutex<Vec<Address>>,
}

impl ScriptedApi {
    /// Empty script over the given bounds
    pub fn new(bounds: AddressSpaceBounds) -> Self {
        ScriptedApi {
            bounds,
            regions: Vec::new(),
            processes: Vec::new(),
            name_faults: HashMap::new(),
            open_denied: HashSet::new(),
            query_faults: HashSet::new(),
            listing_fault: None,
            bounds_fault: None,
            bounds_queries: AtomicUsize::new(0),
            region_queries: AtomicUsize::new(0),
            completions: Mutex::new(Vec::new()),
        }
    }

    /// Declare a live process
    pub fn with_process(mut self, pid: ProcessId, name: impl Into<String>) -> Self {
        self.processes.push((pid, name.into()));
        self
    }

    /// Make name resolution fail for `pid`
    pub fn with_name_fault(mut self, pid: ProcessId, fault: ScriptedFault) -> Self {
        self.name_faults.insert(pid, fault);
        self
    }

    /// Make `open_process` fail for `pid`
    pub fn with_open_denied(mut self, pid: ProcessId) -> Self {
        self.open_denied.insert(pid);
        self
    }

    /// Make process listing fail
    pub fn with_listing_fault(mut self, reason: impl Into<String>) -> Self {
        self.listing_fault = Some(reason.into());
        self
    }

    /// Make bounds resolution fail
    pub fn with_bounds_fault(mut self, reason: impl Into<String>) -> Self {
        self.bounds_fault = Some(reason.into());
        self
    }

    /// Declare a region; its bytes read back as `fill`
    pub fn with_region(mut self, region: Region, fill: u8) -> Self {
        self.regions.push(ScriptedRegion {
            region,
            fill,
            read_fault: None,
            read_delay: Duration::ZERO,
        });
        self.regions.sort_by_key(|r| r.region.base);
        self
    }

    /// Make reads of the region based at `base` fail
    pub fn with_read_fault(mut self, base: Address, fault: ScriptedFault) -> Self {
        if let Some(entry) = self.regions.iter_mut().find(|r| r.region.base == base) {
            entry.read_fault = Some(fault);
        }
        self
    }

    /// Delay reads of the region based at `base`
    pub fn with_read_delay(mut self, base: Address, delay: Duration) -> Self {
        if let Some(entry) = self.regions.iter_mut().find(|r| r.region.base == base) {
            entry.read_delay = delay;
        }
        self
    }

    /// Make region queries at exactly `address` fail
    pub fn with_query_fault(mut self, address: Address) -> Self {
        self.query_faults.insert(address);
        self
    }

    /// Number of times bounds were requested
    pub fn bounds_queries(&self) -> usize {
        self.bounds_queries.load(Ordering::SeqCst)
    }

    /// Number of region queries served
    pub fn region_queries(&self) -> usize {
        self.region_queries.load(Ordering::SeqCst)
    }

    /// Base addresses of successful reads, in completion order
    pub fn completion_order(&self) -> Vec<Address> {
        self.completions
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn record_completion(&self, address: Address) {
        if let Ok(mut log) = self.completions.lock() {
            log.push(address);
        }
    }

    fn scripted_at(&self, address: Address) -> Option<&ScriptedRegion> {
        self.regions
            .iter()
            .find(|r| r.region.base == address)
            .or_else(|| self.regions.iter().find(|r| r.region.contains(address)))
    }

    fn free_span_at(&self, address: Address) -> Region {
        let next = self
            .regions
            .iter()
            .map(|r| r.region.base)
            .find(|&base| base > address)
            .unwrap_or(self.bounds.max);
        Region::free(address, address.distance_to(next))
    }
}

impl OsAccess for ScriptedApi {
    type RawHandle = ScriptedHandle;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn list_process_ids(&self) -> MemoryResult<Vec<ProcessId>> {
        if let Some(reason) = &self.listing_fault {
            return Err(MemoryError::ProcessListFailed(reason.clone()));
        }
        Ok(self.processes.iter().map(|(pid, _)| *pid).collect())
    }

    fn executable_name(&self, pid: ProcessId) -> MemoryResult<String> {
        match self.name_faults.get(&pid) {
            Some(ScriptedFault::AccessDenied) => {
                Err(MemoryError::access_denied(pid, "Access is denied."))
            }
            Some(ScriptedFault::Failure(reason)) => Err(MemoryError::NameResolutionFailed {
                pid,
                reason: reason.clone(),
            }),
            None => self
                .processes
                .iter()
                .find(|(p, _)| *p == pid)
                .map(|(_, name)| name.clone())
                .ok_or_else(|| MemoryError::NameResolutionFailed {
                    pid,
                    reason: "no such process".to_string(),
                }),
        }
    }

    fn open_process(&self, pid: ProcessId, access: ProcessAccess) -> MemoryResult<ScriptedHandle> {
        if self.open_denied.contains(&pid) {
            return Err(MemoryError::access_denied(pid, "scripted denial"));
        }
        if !self.processes.iter().any(|(p, _)| *p == pid) {
            return Err(MemoryError::OpenFailed {
                pid,
                reason: "no such process".to_string(),
            });
        }
        Ok(ScriptedHandle { pid, access })
    }

    fn address_space_bounds(&self) -> MemoryResult<AddressSpaceBounds> {
        self.bounds_queries.fetch_add(1, Ordering::SeqCst);
        match &self.bounds_fault {
            Some(reason) => Err(MemoryError::BoundsUnavailable(reason.clone())),
            None => Ok(self.bounds),
        }
    }

    fn query_region(&self, _handle: &ScriptedHandle, address: Address) -> MemoryResult<Region> {
        self.region_queries.fetch_add(1, Ordering::SeqCst);
        if self.query_faults.contains(&address) {
            return Err(MemoryError::query_failed(address, "scripted query failure"));
        }
        Ok(self
            .scripted_at(address)
            .map(|r| r.region)
            .unwrap_or_else(|| self.free_span_at(address)))
    }

    fn read_memory(
        &self,
        handle: &ScriptedHandle,
        address: Address,
        buffer: &mut [u8],
    ) -> MemoryResult<usize> {
        let entry = self
            .regions
            .iter()
            .find(|r| r.region.contains(address))
            .ok_or_else(|| MemoryError::read_failed(address, "address not mapped"))?;

        if !entry.read_delay.is_zero() {
            thread::sleep(entry.read_delay);
        }
        if let Some(fault) = &entry.read_fault {
            return Err(fault.for_read(handle.pid, address));
        }

        let available = address.distance_to(entry.region.end());
        let count = buffer.len().min(available);
        buffer[..count].fill(entry.fill);
        self.record_completion(entry.region.base);
        Ok(count)
    }
}
