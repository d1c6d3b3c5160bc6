//! Error types for image operations.
//!
//! Every failure a caller can act on is a distinct variant. Lookups never
//! report the sentinel identifier as a result; a path that does not resolve
//! surfaces as one of the `*NotFound` variants instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the table store and the filesystem operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// The backing file could not be opened, mapped, resized or flushed.
    #[error("backing image {} is unavailable: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The metadata region is truncated or holds records that cannot be decoded.
    ///
    /// A table that was partially rewritten before a crash can land here; there
    /// is no recovery path other than formatting.
    #[error("corrupt table: {0}")]
    CorruptTable(String),

    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("entry already exists: {0}")]
    AlreadyExists(String),

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("{0} is a directory")]
    IsADirectory(String),

    /// The root record is only ever created by format and cannot be removed.
    #[error("the root directory cannot be removed")]
    RootDirectory,

    #[error("record table is full ({capacity} slots)")]
    TableFull { capacity: usize },

    #[error("data region exhausted: {requested} bytes requested, {available} available")]
    NoSpace { requested: u64, available: u64 },

    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    #[error("path {path:?} exceeds {max} bytes")]
    PathTooLong { path: String, max: usize },

    #[error("invalid image configuration: {0}")]
    InvalidConfig(String),
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}
