//! Windows backend
//!
//! Safe wrappers around the Win32 process and memory APIs. All unsafe FFI
//! calls are contained within this module; [`WindowsApi`] exposes them to the
//! rest of the crate through [`OsAccess`](crate::os::OsAccess).

pub mod api;
pub mod bindings;
pub mod types;
pub mod utils;

pub use api::WindowsApi;
pub use types::{Handle, MemoryBasicInfo};
pub use utils::{ErrorCode, WinError};

pub use bindings::{kernel32, psapi};
