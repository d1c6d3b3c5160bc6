//! Name resolution over a loaded table.
//!
//! Paths are opaque keys compared byte for byte; nothing here splits a path
//! into components. Lookups scan linearly, which is fine for a table of a
//! thousand slots.

#[cfg(test)]
mod resolve_tests;

use crate::constants::SENTINEL_ID;
use crate::record::FileRecord;

/// First record whose full path equals `path`.
#[must_use]
pub fn find_by_path<'a>(records: &'a [FileRecord], path: &str) -> Option<&'a FileRecord> {
    records.iter().find(|record| record.path == path)
}

/// Identifier of the record at `path`. A free-slot identifier is never
/// returned as a match.
#[must_use]
pub fn identifier_of(records: &[FileRecord], path: &str) -> Option<u32> {
    find_by_path(records, path)
        .map(|record| record.identifier)
        .filter(|&id| id != SENTINEL_ID)
}

/// Position of the record with `identifier` in the live sequence, which is not
/// the same as its slot on disk once sentinels are skipped.
#[must_use]
pub fn slot_position_of(records: &[FileRecord], identifier: u32) -> Option<usize> {
    if identifier == SENTINEL_ID {
        return None;
    }
    records
        .iter()
        .position(|record| record.identifier == identifier)
}

/// Records whose parent is `identifier`, in table order.
pub fn children_of(records: &[FileRecord], identifier: u32) -> impl Iterator<Item = &FileRecord> {
    records
        .iter()
        .filter(move |record| record.parent_identifier == identifier)
}

/// Identifiers of every record below `identifier`, breadth first. The record
/// itself is not included.
#[must_use]
pub fn descendants_of(records: &[FileRecord], identifier: u32) -> Vec<u32> {
    let mut found: Vec<u32> = Vec::new();
    let mut cursor = 0;
    let mut frontier = identifier;
    loop {
        for child in children_of(records, frontier) {
            // A corrupt table could contain a parent cycle.
            if child.identifier != identifier && !found.contains(&child.identifier) {
                found.push(child.identifier);
            }
        }
        let Some(&next) = found.get(cursor) else {
            break;
        };
        frontier = next;
        cursor += 1;
    }
    found
}
