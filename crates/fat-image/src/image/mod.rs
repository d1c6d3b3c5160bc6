
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::error::{FsError, FsResult};

enum Mapping {
    /// Zero-length files cannot be mapped.
    Empty,
    ReadOnly(Mmap),
    ReadWrite(MmapMut),
}

/// Memory-mapped view of the backing file for the duration of one operation.
///
/// Nothing is cached between operations: every load or save maps the file
/// again and drops the mapping when done.
pub struct ImageFile {
    path: PathBuf,
    map: Mapping,
    len: u64,
}

impl ImageFile {
    /// Creates (or truncates) the image and sizes it to `len` zero bytes.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the file cannot be created, resized or mapped.
    pub fn create(path: &Path, len: u64) -> FsResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| FsError::storage(path, e))?;
        file.set_len(len).map_err(|e| FsError::storage(path, e))?;
        Self::map_read_write(path, &file, len)
    }

    /// Maps an existing image for reading.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the file does not exist or cannot be mapped.
    pub fn open_read(path: &Path) -> FsResult<Self> {
        let file = File::open(path).map_err(|e| FsError::storage(path, e))?;
        let len = Self::file_len(path, &file)?;
        let map = if len == 0 {
            Mapping::Empty
        } else {
            let map_len = Self::map_len(len)?;
            let map = unsafe { MmapOptions::new().len(map_len).map(&file) }
                .map_err(|e| FsError::storage(path, e))?;
            Mapping::ReadOnly(map)
        };
        Ok(Self {
            path: path.to_path_buf(),
            map,
            len,
        })
    }

    /// Maps an existing image for reading and writing. The file is never created
    /// or resized here; only [`ImageFile::create`] does that.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the file does not exist or cannot be mapped.
    pub fn open_write(path: &Path) -> FsResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| FsError::storage(path, e))?;
        let len = Self::file_len(path, &file)?;
        Self::map_read_write(path, &file, len)
    }

    fn map_read_write(path: &Path, file: &File, len: u64) -> FsResult<Self> {
        let map = if len == 0 {
            Mapping::Empty
        } else {
            let map_len = Self::map_len(len)?;
            let map = unsafe { MmapOptions::new().len(map_len).map_mut(file) }
                .map_err(|e| FsError::storage(path, e))?;
            Mapping::ReadWrite(map)
        };
        Ok(Self {
            path: path.to_path_buf(),
            map,
            len,
        })
    }

    fn file_len(path: &Path, file: &File) -> FsResult<u64> {
        file.metadata()
            .map(|m| m.len())
            .map_err(|e| FsError::storage(path, e))
    }

    fn map_len(len: u64) -> FsResult<usize> {
        usize::try_from(len)
            .map_err(|_| FsError::CorruptTable(format!("image length {len} exceeds addressable size")))
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(self.map, Mapping::ReadWrite(_))
    }

    fn bytes(&self) -> &[u8] {
        match &self.map {
            Mapping::Empty => &[],
            Mapping::ReadOnly(map) => &map[..],
            Mapping::ReadWrite(map) => &map[..],
        }
    }

    /// Copies up to `buf.len()` bytes starting at `off`; reads are cut short at
    /// the end of the image. Returns the number of bytes copied.
    pub fn read_at(&self, off: u64, buf: &mut [u8]) -> usize {
        let bytes = self.bytes();
        let Ok(off) = usize::try_from(off) else {
            return 0;
        };
        if off >= bytes.len() {
            return 0;
        }
        let end = off.saturating_add(buf.len()).min(bytes.len());
        let src = &bytes[off..end];
        let n = src.len();
        buf[..n].copy_from_slice(src);
        n
    }

    /// Writes as much of `data` as fits before the end of the image. Returns the
    /// number of bytes written; read-only mappings write nothing.
    pub fn write_at(&mut self, off: u64, data: &[u8]) -> usize {
        let Mapping::ReadWrite(map) = &mut self.map else {
            return 0;
        };
        let Ok(off) = usize::try_from(off) else {
            return 0;
        };
        if off >= map.len() {
            return 0;
        }
        let end = off.saturating_add(data.len()).min(map.len());
        let dst = &mut map[off..end];
        let n = dst.len();
        dst.copy_from_slice(&data[..n]);
        n
    }

    /// Zero-fills `len` bytes starting at `off`, clamped to the image end.
    pub fn zero_range(&mut self, off: u64, len: u64) -> usize {
        let Mapping::ReadWrite(map) = &mut self.map else {
            return 0;
        };
        let (Ok(off), Ok(len)) = (usize::try_from(off), usize::try_from(len)) else {
            return 0;
        };
        if off >= map.len() {
            return 0;
        }
        let end = off.saturating_add(len).min(map.len());
        map[off..end].fill(0);
        end - off
    }

    /// Flushes dirty pages to the backing file. Read-only and empty mappings are
    /// a no-op.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the kernel reports a write-back failure.
    pub fn flush(&self) -> FsResult<()> {
        match &self.map {
            Mapping::ReadWrite(map) => map.flush().map_err(|e| FsError::storage(&self.path, e)),
            Mapping::Empty | Mapping::ReadOnly(_) => Ok(()),
        }
    }
}
