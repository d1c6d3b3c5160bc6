//! Fixed-width on-disk record.
//!
//! ```text
//! [0..4)    identifier          u32 LE, 0 = free slot
//! [4..36)   path                31 content bytes + terminator, NUL padded
//! [36..40)  parent identifier   u32 LE, 0 = root
//! [40..44)  size                u32 LE
//! [44]      kind                0 = directory, 1 = file
//! [45..49)  data offset         u32 LE, relative to the data region
//! ```


use crate::constants::{
    DATA_OFFSET_OFFSET, ID_OFFSET, KIND_OFFSET, PARENT_OFFSET, PATH_LEN, PATH_OFFSET,
    RECORD_WIDTH, ROOT_ID, ROOT_PATH, SENTINEL_ID, SIZE_OFFSET,
};
use crate::error::{FsError, FsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Directory => 0,
            Self::File => 1,
        }
    }
}

impl TryFrom<u8> for EntryKind {
    type Error = FsError;

    fn try_from(value: u8) -> FsResult<Self> {
        match value {
            0 => Ok(Self::Directory),
            1 => Ok(Self::File),
            other => Err(FsError::CorruptTable(format!("unknown entry kind byte {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub identifier: u32,
    pub path: String,
    pub parent_identifier: u32,
    pub size: u32,
    pub kind: EntryKind,
    pub data_offset: u32,
}

impl FileRecord {
    #[must_use]
    pub fn root() -> Self {
        Self::directory(ROOT_ID, ROOT_PATH, SENTINEL_ID)
    }

    #[must_use]
    pub fn directory(identifier: u32, path: impl Into<String>, parent_identifier: u32) -> Self {
        Self {
            identifier,
            path: path.into(),
            parent_identifier,
            size: 0,
            kind: EntryKind::Directory,
            data_offset: 0,
        }
    }

    #[must_use]
    pub fn file(
        identifier: u32,
        path: impl Into<String>,
        parent_identifier: u32,
        size: u32,
        data_offset: u32,
    ) -> Self {
        Self {
            identifier,
            path: path.into(),
            parent_identifier,
            size,
            kind: EntryKind::File,
            data_offset,
        }
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_identifier == SENTINEL_ID && self.is_dir()
    }

    /// One past the last data region byte this record owns; `0` for directories.
    #[must_use]
    pub const fn data_end(&self) -> u64 {
        if self.is_file() {
            self.data_offset as u64 + self.size as u64
        } else {
            0
        }
    }

    /// Serializes the record. Paths longer than 31 bytes are truncated; the
    /// terminator byte is always left zero.
    #[must_use]
    pub fn encode(&self) -> [u8; RECORD_WIDTH] {
        let mut buf = [0u8; RECORD_WIDTH];
        buf[ID_OFFSET..ID_OFFSET + 4].copy_from_slice(&self.identifier.to_le_bytes());
        let path_bytes = self.path.as_bytes();
        let max = path_bytes.len().min(PATH_LEN);
        buf[PATH_OFFSET..PATH_OFFSET + max].copy_from_slice(&path_bytes[..max]);
        buf[PARENT_OFFSET..PARENT_OFFSET + 4].copy_from_slice(&self.parent_identifier.to_le_bytes());
        buf[SIZE_OFFSET..SIZE_OFFSET + 4].copy_from_slice(&self.size.to_le_bytes());
        buf[KIND_OFFSET] = self.kind.as_byte();
        buf[DATA_OFFSET_OFFSET..DATA_OFFSET_OFFSET + 4]
            .copy_from_slice(&self.data_offset.to_le_bytes());
        buf
    }

    /// # Errors
    /// Returns `CorruptTable` if the kind byte is not a known entry kind.
    pub fn decode(buf: &[u8; RECORD_WIDTH]) -> FsResult<Self> {
        let path_bytes = &buf[PATH_OFFSET..PATH_OFFSET + PATH_LEN];
        let end = path_bytes.iter().position(|b| *b == 0).unwrap_or(PATH_LEN);
        let path = String::from_utf8_lossy(&path_bytes[..end]).into_owned();
        Ok(Self {
            identifier: read_u32(buf, ID_OFFSET),
            path,
            parent_identifier: read_u32(buf, PARENT_OFFSET),
            size: read_u32(buf, SIZE_OFFSET),
            kind: EntryKind::try_from(buf[KIND_OFFSET])?,
            data_offset: read_u32(buf, DATA_OFFSET_OFFSET),
        })
    }

    /// # Errors
    /// Returns `CorruptTable` unless `buf` is exactly one record wide and decodes.
    pub fn decode_slice(buf: &[u8]) -> FsResult<Self> {
        let buf: &[u8; RECORD_WIDTH] = buf.try_into().map_err(|_| {
            FsError::CorruptTable(format!(
                "record buffer is {} bytes, expected {RECORD_WIDTH}",
                buf.len()
            ))
        })?;
        Self::decode(buf)
    }
}

/// Identifier stored in a serialized slot, read without decoding the rest.
#[must_use]
pub fn slot_identifier(buf: &[u8; RECORD_WIDTH]) -> u32 {
    read_u32(buf, ID_OFFSET)
}

fn read_u32(buf: &[u8; RECORD_WIDTH], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(word)
}
