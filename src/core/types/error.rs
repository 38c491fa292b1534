//! Error types for address-space walking and memory reads

use super::{Address, Region};
use std::fmt;
use thiserror::Error;

/// Main error type for memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Access denied to process {pid}: {reason}")]
    AccessDenied { pid: u32, reason: String },

    #[error("Failed to list processes: {0}")]
    ProcessListFailed(String),

    #[error("Failed to resolve executable name for PID {pid}: {reason}")]
    NameResolutionFailed { pid: u32, reason: String },

    #[error("Failed to open process {pid}: {reason}")]
    OpenFailed { pid: u32, reason: String },

    #[error("Failed to resolve address space bounds: {0}")]
    BoundsUnavailable(String),

    #[error("Region query failed at {address}: {reason}")]
    QueryFailed { address: String, reason: String },

    #[error("Region at {address} reported a size of zero")]
    ZeroSizeRegion { address: String },

    #[error("Region reported for {address} does not advance the cursor: {reason}")]
    NoProgress { address: String, reason: String },

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Refusing zero-size read at {address}")]
    ZeroSizeRead { address: String },

    #[error("Failed to start reader threads: {0}")]
    ThreadPool(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Windows API: {0}")]
    WindowsApi(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates an access denied error for a process
    pub fn access_denied(pid: u32, reason: impl Into<String>) -> Self {
        MemoryError::AccessDenied {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a region query failed error
    pub fn query_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::QueryFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a zero-size region error
    pub fn zero_size_region(address: impl fmt::Display) -> Self {
        MemoryError::ZeroSizeRegion {
            address: address.to_string(),
        }
    }

    /// Creates a zero-size read error
    pub fn zero_size_read(address: impl fmt::Display) -> Self {
        MemoryError::ZeroSizeRead {
            address: address.to_string(),
        }
    }

    /// True when the failure is a permissions problem rather than a broken request
    pub fn is_access_denied(&self) -> bool {
        match self {
            MemoryError::AccessDenied { .. } => true,
            MemoryError::IoError(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

/// Fatal enumeration failure carrying the regions gathered before it
#[derive(Error, Debug)]
#[error("Region enumeration stopped at {address} after {} regions: {source}", .partial.len())]
pub struct EnumerationError {
    /// Cursor position when the failure occurred
    pub address: Address,
    /// Regions successfully enumerated before the failure, in ascending order
    pub partial: Vec<Region>,
    /// Underlying cause
    #[source]
    pub source: MemoryError,
}

impl EnumerationError {
    /// Consumes the error, returning the partial region list
    pub fn into_partial(self) -> Vec<Region> {
        self.partial
    }
}

impl From<EnumerationError> for MemoryError {
    fn from(err: EnumerationError) -> Self {
        err.source
    }
}
