//! Address-space bounds resolution

use crate::core::types::{AddressSpaceBounds, MemoryError, MemoryResult};
use crate::os::OsAccess;
use once_cell::sync::OnceCell;
use tracing::debug;

/// Query the machine-wide application address range once.
///
/// Failure is fatal to any scan: without bounds there is nothing to walk.
pub fn resolve_bounds<A: OsAccess>(api: &A) -> MemoryResult<AddressSpaceBounds> {
    let bounds = api.address_space_bounds()?;
    if bounds.max < bounds.min {
        return Err(MemoryError::BoundsUnavailable(format!(
            "maximum {} lies below minimum {}",
            bounds.max, bounds.min
        )));
    }
    debug!(%bounds, backend = api.name(), "Resolved address space bounds");
    Ok(bounds)
}

/// Caches the bounds after the first successful query.
///
/// The range is machine-wide and stable for the life of this process, so
/// one resolver can serve every scan against any target.
pub struct BoundsResolver<'a, A: OsAccess> {
    api: &'a A,
    cached: OnceCell<AddressSpaceBounds>,
}

impl<'a, A: OsAccess> BoundsResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        BoundsResolver {
            api,
            cached: OnceCell::new(),
        }
    }

    /// Cached bounds, querying the OS on first use
    pub fn resolve(&self) -> MemoryResult<AddressSpaceBounds> {
        self.cached
            .get_or_try_init(|| resolve_bounds(self.api))
            .copied()
    }

    pub fn is_cached(&self) -> bool {
        self.cached.get().is_some()
    }
}
