//! Process discovery and handle management
//!
//! Locates a target by executable name and opens a typed handle to it
//! through an [`OsAccess`](crate::os::OsAccess) backend.

pub mod enumerator;
pub mod handle;

pub use enumerator::{enumerate_processes, find_process_by_name, ProcessEnumerator};
pub use handle::ProcessHandle;
