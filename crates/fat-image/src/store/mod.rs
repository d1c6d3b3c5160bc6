//! Whole-table persistence and data region access.
//!
//! The table is never updated in place: `load` decodes every slot, callers
//! edit the returned `Vec`, and `save` rewrites the full metadata region from
//! it. Records left out of a `save` are gone.
//!
//! `save` is not atomic. Records are written slot by slot into a shared
//! mapping and flushed at the end, so a crash or write-back failure part way
//! through can leave a mixture of old and new records on disk. Nothing here
//! detects or repairs that.

#[cfg(test)]
mod store_tests;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::{ImageConfig, ImageLayout};
use crate::constants::{RECORD_WIDTH, SENTINEL_ID};
use crate::error::{FsError, FsResult};
use crate::image::ImageFile;
use crate::metrics::{IoOpType, Region, timed};
use crate::record::{FileRecord, slot_identifier};

#[derive(Debug, Clone, Default)]
pub struct TableStore {
    config: ImageConfig,
}

impl TableStore {
    #[must_use]
    pub const fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ImageConfig {
        &self.config
    }

    #[must_use]
    pub const fn layout(&self) -> ImageLayout {
        self.config.layout()
    }

    /// Reads every slot and returns the live records in slot order.
    ///
    /// # Errors
    /// `StorageUnavailable` if the image cannot be opened; `CorruptTable` if the
    /// metadata region is short, a live slot does not decode, two live slots
    /// share an identifier, or a file claims bytes past the data region.
    pub fn load(&self) -> FsResult<Vec<FileRecord>> {
        let layout = self.layout();
        let path = &self.config.path;
        let records = timed(Region::Metadata, IoOpType::Read, layout.metadata_len(), || {
            let image = ImageFile::open_read(path)?;
            if image.len() < layout.metadata_len() {
                return Err(FsError::CorruptTable(format!(
                    "image holds {} bytes, metadata region needs {}",
                    image.len(),
                    layout.metadata_len()
                )));
            }

            let mut records = Vec::new();
            let mut seen = HashSet::new();
            let mut slot = [0u8; RECORD_WIDTH];
            for index in 0..layout.slot_capacity {
                if image.read_at(layout.slot_offset(index), &mut slot) != RECORD_WIDTH {
                    return Err(FsError::CorruptTable(format!("slot {index} is truncated")));
                }
                if slot_identifier(&slot) == SENTINEL_ID {
                    continue;
                }
                let record = FileRecord::decode(&slot)?;
                if !seen.insert(record.identifier) {
                    return Err(FsError::CorruptTable(format!(
                        "identifier {} appears twice (slot {index})",
                        record.identifier
                    )));
                }
                if record.data_end() > layout.data_region_len {
                    return Err(FsError::CorruptTable(format!(
                        "{} ends at byte {} of a {}-byte data region",
                        record.path,
                        record.data_end(),
                        layout.data_region_len
                    )));
                }
                records.push(record);
            }
            Ok(records)
        })?;
        debug!(
            "table: loaded {} live records from {}",
            records.len(),
            path.display()
        );
        Ok(records)
    }

    /// Rewrites the metadata region with `records` followed by sentinel slots.
    /// The data region is left untouched.
    ///
    /// # Errors
    /// `TableFull` if there are more records than slots (nothing is written);
    /// `StorageUnavailable` if the image cannot be opened or flushed;
    /// `CorruptTable` if the image is shorter than the metadata region.
    pub fn save(&self, records: &[FileRecord]) -> FsResult<()> {
        let layout = self.layout();
        if records.len() > layout.slot_capacity {
            return Err(FsError::TableFull {
                capacity: layout.slot_capacity,
            });
        }
        let path = &self.config.path;
        timed(Region::Metadata, IoOpType::Write, layout.metadata_len(), || {
            let mut image = ImageFile::open_write(path)?;
            if image.len() < layout.metadata_len() {
                return Err(FsError::CorruptTable(format!(
                    "image holds {} bytes, metadata region needs {}",
                    image.len(),
                    layout.metadata_len()
                )));
            }
            for (index, record) in records.iter().enumerate() {
                image.write_at(layout.slot_offset(index), &record.encode());
            }
            let tail = layout.slot_offset(records.len());
            image.zero_range(tail, layout.metadata_len() - tail);
            image.flush()
        })?;
        debug!(
            "table: wrote {} live records to {}",
            records.len(),
            path.display()
        );
        Ok(())
    }

    /// Creates or truncates the image: root record, sentinel slots and a zeroed
    /// data region. All prior content is destroyed.
    ///
    /// # Errors
    /// `InvalidConfig` for an unusable layout; `StorageUnavailable` if the image
    /// cannot be created, sized or flushed.
    pub fn initialize(&self) -> FsResult<()> {
        self.config.validate()?;
        let layout = self.layout();
        let path = &self.config.path;
        timed(Region::Metadata, IoOpType::Write, layout.total_len(), || {
            // Truncate-then-resize leaves every slot and the data region zeroed.
            let mut image = ImageFile::create(path, layout.total_len())?;
            image.write_at(0, &FileRecord::root().encode());
            image.flush()
        })?;
        info!(
            "table: formatted {} ({} slots, {} byte data region)",
            path.display(),
            layout.slot_capacity,
            layout.data_region_len
        );
        Ok(())
    }

    /// Reads `len` bytes at `offset` within the data region.
    ///
    /// # Errors
    /// `CorruptTable` if the range lies outside the data region or the image is
    /// truncated; `StorageUnavailable` if the image cannot be opened.
    pub fn read_data(&self, offset: u32, len: u32) -> FsResult<Vec<u8>> {
        let layout = self.layout();
        let end = u64::from(offset) + u64::from(len);
        if end > layout.data_region_len {
            return Err(FsError::CorruptTable(format!(
                "range {offset}..{end} lies outside the {}-byte data region",
                layout.data_region_len
            )));
        }
        timed(Region::Data, IoOpType::Read, u64::from(len), || {
            let image = ImageFile::open_read(&self.config.path)?;
            let mut buf = vec![0u8; len as usize];
            let read = image.read_at(layout.data_start() + u64::from(offset), &mut buf);
            if read != buf.len() {
                return Err(FsError::CorruptTable(format!(
                    "image truncated: read {read} of {len} bytes at data offset {offset}"
                )));
            }
            Ok(buf)
        })
    }

    /// Writes `data` at `offset` within the data region and flushes it.
    ///
    /// # Errors
    /// `NoSpace` if the data would run past the data region; `CorruptTable` if
    /// the image is truncated; `StorageUnavailable` on open or flush failure.
    pub fn write_data(&self, offset: u32, data: &[u8]) -> FsResult<()> {
        let layout = self.layout();
        let requested = data.len() as u64;
        if u64::from(offset) + requested > layout.data_region_len {
            return Err(FsError::NoSpace {
                requested,
                available: layout.data_region_len.saturating_sub(u64::from(offset)),
            });
        }
        timed(Region::Data, IoOpType::Write, requested, || {
            let mut image = ImageFile::open_write(&self.config.path)?;
            let written = image.write_at(layout.data_start() + u64::from(offset), data);
            if written != data.len() {
                return Err(FsError::CorruptTable(format!(
                    "image truncated: wrote {written} of {requested} bytes at data offset {offset}"
                )));
            }
            image.flush()
        })
    }
}
