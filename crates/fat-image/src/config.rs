//! Image configuration and the byte layout derived from it.

use std::path::{Path, PathBuf};

use crate::constants::{DATA_REGION_LEN, DEFAULT_IMAGE_NAME, RECORD_WIDTH, SLOT_CAPACITY};
use crate::error::{FsError, FsResult};

/// Where the image lives and how large its two regions are.
///
/// The defaults reproduce the well-known layout: `FILE.DAT` in the working
/// directory, 1000 record slots and a 1,000,000 byte data region. Opening an
/// existing image with a different configuration than the one it was
/// formatted with reads garbage; the file carries no header to detect that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub path: PathBuf,
    pub slot_capacity: usize,
    pub data_region_len: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_IMAGE_NAME),
            slot_capacity: SLOT_CAPACITY,
            data_region_len: DATA_REGION_LEN,
        }
    }
}

impl ImageConfig {
    /// Default layout stored at `path`.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_slot_capacity(mut self, slot_capacity: usize) -> Self {
        self.slot_capacity = slot_capacity;
        self
    }

    #[must_use]
    pub fn with_data_region_len(mut self, data_region_len: u64) -> Self {
        self.data_region_len = data_region_len;
        self
    }

    /// # Errors
    /// Returns `InvalidConfig` if there are no slots, or if the regions cannot be
    /// addressed with the 32-bit identifiers and offsets a record stores.
    pub fn validate(&self) -> FsResult<()> {
        if self.slot_capacity == 0 {
            return Err(FsError::InvalidConfig("slot capacity must be non-zero".into()));
        }
        if u32::try_from(self.slot_capacity).is_err() {
            return Err(FsError::InvalidConfig(format!(
                "slot capacity {} exceeds the identifier space",
                self.slot_capacity
            )));
        }
        if u32::try_from(self.data_region_len).is_err() {
            return Err(FsError::InvalidConfig(format!(
                "data region of {} bytes cannot be addressed by 32-bit offsets",
                self.data_region_len
            )));
        }
        let layout = self.layout();
        if usize::try_from(layout.total_len()).is_err() {
            return Err(FsError::InvalidConfig(format!(
                "image length {} exceeds addressable size",
                layout.total_len()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn layout(&self) -> ImageLayout {
        ImageLayout {
            slot_capacity: self.slot_capacity,
            data_region_len: self.data_region_len,
        }
    }
}

/// Byte offsets of the metadata and data regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    pub slot_capacity: usize,
    pub data_region_len: u64,
}

impl ImageLayout {
    #[must_use]
    pub const fn metadata_len(&self) -> u64 {
        (self.slot_capacity as u64) * (RECORD_WIDTH as u64)
    }

    /// Absolute file offset of the first data region byte.
    #[must_use]
    pub const fn data_start(&self) -> u64 {
        self.metadata_len()
    }

    #[must_use]
    pub const fn total_len(&self) -> u64 {
        self.metadata_len() + self.data_region_len
    }

    #[must_use]
    pub const fn slot_offset(&self, slot: usize) -> u64 {
        (slot as u64) * (RECORD_WIDTH as u64)
    }
}
