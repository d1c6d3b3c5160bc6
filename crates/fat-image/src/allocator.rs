//! Data region and identifier allocation.
//!
//! Data offsets come from a high-water mark: the next file starts where the
//! furthest-reaching file ever allocated ends. Space freed by deleting a file
//! is never handed out again, so the data region fills up over the lifetime of
//! an image no matter how much is deleted.
//!
//! Directories have no content, so the root record's `data_offset` carries the
//! mark across deletions of the furthest file. Format resets it to zero.

use crate::constants::SENTINEL_ID;
use crate::error::{FsError, FsResult};
use crate::record::FileRecord;

/// Larger of the recorded mark and the end of the furthest-reaching live
/// file; `0` on a fresh image.
#[must_use]
pub fn next_free_offset(records: &[FileRecord]) -> u64 {
    let live_end = records
        .iter()
        .filter(|record| record.is_file())
        .map(FileRecord::data_end)
        .max()
        .unwrap_or(0);
    live_end.max(recorded_mark(records))
}

fn recorded_mark(records: &[FileRecord]) -> u64 {
    records
        .iter()
        .find(|record| record.is_root())
        .map_or(0, |root| u64::from(root.data_offset))
}

/// Raises the mark kept in the root record to `end`. Tables without a root
/// keep relying on live file ends alone.
pub fn advance_mark(records: &mut [FileRecord], end: u64) {
    let end = u32::try_from(end).unwrap_or(u32::MAX);
    if let Some(root) = records.iter_mut().find(|record| record.is_root()) {
        root.data_offset = root.data_offset.max(end);
    }
}

/// One past the largest live identifier.
///
/// The identifier of a removed record that held the maximum can come back.
/// Directory removal cascades, so no live record still refers to it.
///
/// # Errors
/// Returns `TableFull` once the identifier space is exhausted.
pub fn next_identifier(records: &[FileRecord]) -> FsResult<u32> {
    let highest = records
        .iter()
        .map(|record| record.identifier)
        .max()
        .unwrap_or(SENTINEL_ID);
    highest.checked_add(1).ok_or(FsError::TableFull {
        capacity: records.len(),
    })
}

/// Bytes held by live files.
#[must_use]
pub fn used_bytes(records: &[FileRecord]) -> u64 {
    records
        .iter()
        .filter(|record| record.is_file())
        .map(|record| u64::from(record.size))
        .sum()
}
