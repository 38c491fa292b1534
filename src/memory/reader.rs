//! Whole-region memory reads

use crate::core::types::{Address, MemoryError, MemoryResult, ReadOutcome, Region};
use crate::memory::regions::is_readable;
use crate::os::OsAccess;
use crate::process::ProcessHandle;
use tracing::{debug, trace};

/// Copies complete regions out of the target into owned buffers.
///
/// A read either fills the whole buffer or fails; short copies are reported
/// as errors and never exposed to the caller.
pub struct MemoryReader<'h, 'a, A: OsAccess> {
    handle: &'h ProcessHandle<'a, A>,
}

impl<'h, 'a, A: OsAccess> MemoryReader<'h, 'a, A> {
    /// Create a new memory reader
    pub fn new(handle: &'h ProcessHandle<'a, A>) -> Self {
        MemoryReader { handle }
    }

    /// Read exactly `size` bytes starting at `base`
    pub fn read(&self, base: Address, size: usize) -> MemoryResult<Vec<u8>> {
        if size == 0 {
            return Err(MemoryError::zero_size_read(base));
        }

        let mut buffer = vec![0u8; size];
        let copied = self.handle.read_memory(base, &mut buffer)?;
        if copied != size {
            return Err(MemoryError::read_failed(
                base,
                format!("partial copy: {} of {} bytes", copied, size),
            ));
        }

        trace!(%base, size, "Read region");
        Ok(buffer)
    }

    /// Read a region's full extent
    pub fn read_region(&self, region: &Region) -> MemoryResult<Vec<u8>> {
        self.read(region.base, region.size)
    }

    /// Classify and, if readable, read one region.
    ///
    /// Unreadable regions are skipped (no bytes, no error); read failures are
    /// captured in the outcome rather than returned.
    pub fn read_outcome(&self, region: &Region) -> ReadOutcome {
        if !is_readable(region) {
            return ReadOutcome::skipped(*region);
        }
        match self.read_region(region) {
            Ok(bytes) => ReadOutcome::read(*region, bytes),
            Err(e) => {
                debug!(region = %region, error = %e, "Region read failed");
                ReadOutcome::failed(*region, e)
            }
        }
    }
}
