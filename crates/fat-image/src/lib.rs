//! Single-file FAT-style disk image.
//!
//! One host file holds a fixed table of metadata records followed by a fixed
//! data region. Every operation on [`FatImage`] reloads the whole table from
//! disk, works on an owned copy, and rewrites the whole table when it mutates
//! anything. Access is not synchronized across handles or processes.
#![allow(clippy::cargo_common_metadata)]

pub mod allocator;
pub mod config;
pub mod constants;
pub mod error;
pub mod fs;
pub mod image;
pub mod metrics;
pub mod record;
pub mod resolve;
pub mod store;

pub use config::{ImageConfig, ImageLayout};
pub use error::{FsError, FsResult};
pub use fs::{DirEntry, FatImage, ImageStats};
pub use record::{EntryKind, FileRecord};
pub use store::TableStore;
