//! Directory and file operations on a single-file image.


use std::path::Path;

use tracing::{debug, warn};

use crate::allocator::{advance_mark, next_free_offset, next_identifier, used_bytes};
use crate::config::ImageConfig;
use crate::constants::PATH_LEN;
use crate::error::{FsError, FsResult};
use crate::record::{EntryKind, FileRecord};
use crate::resolve::{children_of, descendants_of, find_by_path, slot_position_of};
use crate::store::TableStore;

/// A listed entry. The data offset stays internal to the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub identifier: u32,
    pub path: String,
    pub parent_identifier: u32,
    pub size: u32,
    pub kind: EntryKind,
}

impl DirEntry {
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

impl From<&FileRecord> for DirEntry {
    fn from(record: &FileRecord) -> Self {
        Self {
            identifier: record.identifier,
            path: record.path.clone(),
            parent_identifier: record.parent_identifier,
            size: record.size,
            kind: record.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageStats {
    pub entries: usize,
    pub slot_capacity: usize,
    /// Data region offset the next file will be written at.
    pub high_water_mark: u64,
    /// Content bytes referenced by live files.
    pub live_bytes: u64,
    pub data_region_len: u64,
}

impl ImageStats {
    #[must_use]
    pub const fn free_slots(&self) -> usize {
        self.slot_capacity.saturating_sub(self.entries)
    }

    /// Bytes still available to new files. Deleted content below the mark is
    /// not counted.
    #[must_use]
    pub const fn remaining_bytes(&self) -> u64 {
        self.data_region_len.saturating_sub(self.high_water_mark)
    }
}

/// Handle to one image file.
///
/// The handle holds configuration only. Every call reloads the table from
/// disk and mutating calls write it back in full, so two handles (or two
/// processes) on the same file can lose each other's updates. Mutating
/// methods take `&mut self` so one handle at least serializes its own calls.
#[derive(Debug, Clone, Default)]
pub struct FatImage {
    store: TableStore,
}

impl FatImage {
    #[must_use]
    pub const fn new(config: ImageConfig) -> Self {
        Self {
            store: TableStore::new(config),
        }
    }

    /// Default layout stored at `path`.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self::new(ImageConfig::at(path))
    }

    #[must_use]
    pub const fn config(&self) -> &ImageConfig {
        self.store.config()
    }

    #[must_use]
    pub const fn store(&self) -> &TableStore {
        &self.store
    }

    /// Resets the image to a root directory and an empty data region.
    ///
    /// # Errors
    /// `InvalidConfig` or `StorageUnavailable`, see [`TableStore::initialize`].
    pub fn format(&mut self) -> FsResult<()> {
        self.store.initialize()
    }

    /// Adds a directory at `new_path` under the directory at `parent_path`.
    ///
    /// # Errors
    /// `InvalidPath`/`PathTooLong` for an unusable `new_path`,
    /// `DirectoryNotFound`/`NotADirectory` for the parent, `AlreadyExists`,
    /// `TableFull`, or any table store error.
    pub fn make_directory(&mut self, parent_path: &str, new_path: &str) -> FsResult<()> {
        validate_new_path(new_path)?;
        let mut records = self.store.load()?;
        let parent = resolve_directory(&records, parent_path)?;
        if find_by_path(&records, new_path).is_some() {
            return Err(FsError::AlreadyExists(new_path.to_string()));
        }
        self.ensure_free_slot(&records)?;

        let identifier = next_identifier(&records)?;
        records.push(FileRecord::directory(identifier, new_path, parent));
        self.store.save(&records)?;
        debug!("fs: mkdir {new_path} (id {identifier}, parent {parent})");
        Ok(())
    }

    /// Entries whose parent is the directory at `path`, in table order.
    ///
    /// # Errors
    /// `DirectoryNotFound`, `NotADirectory`, or any table store error.
    pub fn list_directory(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let records = self.store.load()?;
        let identifier = resolve_directory(&records, path)?;
        Ok(children_of(&records, identifier).map(DirEntry::from).collect())
    }

    /// Removes the directory at `path` together with everything below it.
    /// Content of removed files stays in the data region, unreclaimed.
    ///
    /// # Errors
    /// `EntryNotFound`, `NotADirectory`, `RootDirectory`, or any table store error.
    pub fn remove_directory(&mut self, path: &str) -> FsResult<()> {
        let mut records = self.store.load()?;
        let target = find_by_path(&records, path)
            .ok_or_else(|| FsError::EntryNotFound(path.to_string()))?;
        if !target.is_dir() {
            return Err(FsError::NotADirectory(path.to_string()));
        }
        if target.is_root() {
            return Err(FsError::RootDirectory);
        }
        let identifier = target.identifier;
        let position = slot_position_of(&records, identifier)
            .ok_or_else(|| FsError::EntryNotFound(path.to_string()))?;

        let mark = next_free_offset(&records);
        let descendants = descendants_of(&records, identifier);
        records.remove(position);
        records.retain(|record| !descendants.contains(&record.identifier));
        advance_mark(&mut records, mark);
        self.store.save(&records)?;
        debug!(
            "fs: rmdir {path} (id {identifier}, {} entries below removed)",
            descendants.len()
        );
        Ok(())
    }

    /// Stores `content` as a new file at `new_path` in the directory at
    /// `parent_path`.
    ///
    /// Content is written to the data region before the table is saved. If the
    /// save fails the bytes stay above the high-water mark, unreferenced, and
    /// the next file overwrites them.
    ///
    /// # Errors
    /// `InvalidPath`/`PathTooLong`, `AlreadyExists`, `DirectoryNotFound`/
    /// `NotADirectory` for the parent, `TableFull`, `NoSpace` when the content
    /// does not fit above the high-water mark, or any table store error.
    pub fn create_file(&mut self, parent_path: &str, new_path: &str, content: &[u8]) -> FsResult<()> {
        validate_new_path(new_path)?;
        let mut records = self.store.load()?;
        if find_by_path(&records, new_path).is_some() {
            return Err(FsError::AlreadyExists(new_path.to_string()));
        }
        let parent = resolve_directory(&records, parent_path)?;
        self.ensure_free_slot(&records)?;
        let identifier = next_identifier(&records)?;

        let region_len = self.store.layout().data_region_len;
        let start = next_free_offset(&records);
        let requested = content.len() as u64;
        let end = start.saturating_add(requested);
        if end > region_len {
            return Err(FsError::NoSpace {
                requested,
                available: region_len.saturating_sub(start),
            });
        }
        let (Ok(offset), Ok(size)) = (u32::try_from(start), u32::try_from(content.len())) else {
            return Err(FsError::NoSpace {
                requested,
                available: region_len.saturating_sub(start),
            });
        };

        self.store.write_data(offset, content)?;
        records.push(FileRecord::file(identifier, new_path, parent, size, offset));
        advance_mark(&mut records, end);
        if let Err(err) = self.store.save(&records) {
            warn!("fs: {new_path}: content written at data offset {offset} but table save failed: {err}");
            return Err(err);
        }
        debug!("fs: create {new_path} (id {identifier}, {size} bytes at {offset})");
        Ok(())
    }

    /// Content of the file at `path`.
    ///
    /// # Errors
    /// `EntryNotFound`, `IsADirectory`, or any table store error.
    pub fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        let records = self.store.load()?;
        let record = find_by_path(&records, path)
            .ok_or_else(|| FsError::EntryNotFound(path.to_string()))?;
        if record.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        self.store.read_data(record.data_offset, record.size)
    }

    /// Removes the file at `path` from the table. Its bytes stay in the data
    /// region and are not reused.
    ///
    /// # Errors
    /// `EntryNotFound`, `IsADirectory`, or any table store error.
    pub fn delete_file(&mut self, path: &str) -> FsResult<()> {
        let mut records = self.store.load()?;
        let record = find_by_path(&records, path)
            .ok_or_else(|| FsError::EntryNotFound(path.to_string()))?;
        if record.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        let identifier = record.identifier;
        let position = slot_position_of(&records, identifier)
            .ok_or_else(|| FsError::EntryNotFound(path.to_string()))?;

        let mark = next_free_offset(&records);
        records.remove(position);
        advance_mark(&mut records, mark);
        self.store.save(&records)?;
        debug!("fs: unlink {path} (id {identifier})");
        Ok(())
    }

    /// # Errors
    /// Any table store error.
    pub fn exists(&self, path: &str) -> FsResult<bool> {
        let records = self.store.load()?;
        Ok(find_by_path(&records, path).is_some())
    }

    /// # Errors
    /// `EntryNotFound`, or any table store error.
    pub fn metadata(&self, path: &str) -> FsResult<DirEntry> {
        let records = self.store.load()?;
        find_by_path(&records, path)
            .map(DirEntry::from)
            .ok_or_else(|| FsError::EntryNotFound(path.to_string()))
    }

    /// # Errors
    /// Any table store error.
    pub fn stats(&self) -> FsResult<ImageStats> {
        let records = self.store.load()?;
        let layout = self.store.layout();
        Ok(ImageStats {
            entries: records.len(),
            slot_capacity: layout.slot_capacity,
            high_water_mark: next_free_offset(&records),
            live_bytes: used_bytes(&records),
            data_region_len: layout.data_region_len,
        })
    }

    fn ensure_free_slot(&self, records: &[FileRecord]) -> FsResult<()> {
        let capacity = self.store.layout().slot_capacity;
        if records.len() >= capacity {
            return Err(FsError::TableFull { capacity });
        }
        Ok(())
    }
}

fn resolve_directory(records: &[FileRecord], path: &str) -> FsResult<u32> {
    match find_by_path(records, path) {
        Some(record) if record.is_dir() => Ok(record.identifier),
        Some(_) => Err(FsError::NotADirectory(path.to_string())),
        None => Err(FsError::DirectoryNotFound(path.to_string())),
    }
}

fn validate_new_path(path: &str) -> FsResult<()> {
    if path.is_empty() || path.contains('\0') {
        return Err(FsError::InvalidPath(path.to_string()));
    }
    if path.len() > PATH_LEN {
        return Err(FsError::PathTooLong {
            path: path.to_string(),
            max: PATH_LEN,
        });
    }
    Ok(())
}
