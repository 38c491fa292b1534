//! `/proc/<pid>/maps` parsing
//!
//! Each line describes one mapping:
//! `start-end perms offset dev inode [path]`, with hex addresses and a
//! four-character permission field such as `r-xp`.

use crate::core::types::{Address, MemoryError, MemoryResult, ProtectionFlags, Region};

/// One mapping line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapsEntry {
    pub start: Address,
    pub end: Address,
    pub protection: ProtectionFlags,
}

impl MapsEntry {
    pub fn contains(&self, address: Address) -> bool {
        self.start <= address && address < self.end
    }
}

/// Translate the `rwx` part of a permission field.
///
/// Copy-on-write (`p`) and shared (`s`) mappings are treated alike.
pub fn protection_from_perms(perms: &str) -> MemoryResult<ProtectionFlags> {
    let bytes = perms.as_bytes();
    if bytes.len() < 3 {
        return Err(MemoryError::Unknown(format!(
            "malformed permission field: {:?}",
            perms
        )));
    }

    let read = bytes[0] == b'r';
    let write = bytes[1] == b'w';
    let execute = bytes[2] == b'x';

    Ok(match (read, write, execute) {
        (true, false, false) => ProtectionFlags::read_only(),
        (true, true, false) => ProtectionFlags::read_write(),
        (true, false, true) => ProtectionFlags::execute_read(),
        (true, true, true) => ProtectionFlags::execute_read_write(),
        (false, _, true) => ProtectionFlags::execute(),
        (false, _, false) => ProtectionFlags::no_access(),
    })
}

/// Parse one maps line
pub fn parse_line(line: &str) -> MemoryResult<MapsEntry> {
    let malformed = || MemoryError::Unknown(format!("malformed maps line: {:?}", line));

    let mut fields = line.split_whitespace();
    let range = fields.next().ok_or_else(malformed)?;
    let perms = fields.next().ok_or_else(malformed)?;

    let (start, end) = range.split_once('-').ok_or_else(malformed)?;
    let start = usize::from_str_radix(start, 16).map_err(|_| malformed())?;
    let end = usize::from_str_radix(end, 16).map_err(|_| malformed())?;
    if end < start {
        return Err(malformed());
    }

    Ok(MapsEntry {
        start: Address::new(start),
        end: Address::new(end),
        protection: protection_from_perms(perms)?,
    })
}

/// Parse a whole maps file; blank lines are ignored
pub fn parse_maps(text: &str) -> MemoryResult<Vec<MapsEntry>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

/// Region containing `address`, in the same shape `VirtualQueryEx` reports.
///
/// A mapped address yields its committed mapping; an unmapped one yields a
/// free span running up to the next mapping or `limit`. Mappings past
/// `limit` (such as `[vsyscall]`) are cut off.
pub fn region_at(entries: &[MapsEntry], address: Address, limit: Address) -> Region {
    if let Some(entry) = entries.iter().find(|e| e.contains(address)) {
        let end = entry.end.min(limit);
        return Region::committed(entry.start, entry.start.distance_to(end), entry.protection);
    }

    let next = entries
        .iter()
        .map(|e| e.start)
        .filter(|&start| start > address)
        .min()
        .unwrap_or(limit)
        .min(limit);
    Region::free(address, address.distance_to(next))
}
