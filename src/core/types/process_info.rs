//! Identity of a discovered target process

use super::ProcessId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A live process located by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: ProcessId,
    /// Executable base file name, including any OS suffix
    pub name: String,
}

impl ProcessInfo {
    pub fn new(pid: ProcessId, name: impl Into<String>) -> Self {
        ProcessInfo {
            pid,
            name: name.into(),
        }
    }

    /// Exact, case-sensitive name comparison on every OS
    pub fn name_matches(&self, target: &str) -> bool {
        self.name == target
    }
}

impl fmt::Display for ProcessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (PID {})", self.name, self.pid)
    }
}
