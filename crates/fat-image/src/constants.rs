//! On-disk layout constants for the FAT-style image.

/// DEFAULT_IMAGE_NAME is the well-known backing file name.
pub const DEFAULT_IMAGE_NAME: &str = "FILE.DAT";
/// SLOT_CAPACITY is the default number of record slots in the metadata region.
pub const SLOT_CAPACITY: usize = 1000;
/// DATA_REGION_LEN is the default size of the data region in bytes.
pub const DATA_REGION_LEN: u64 = 1_000_000;

/// PATH_LEN is the number of path content bytes stored per record.
pub const PATH_LEN: usize = 31;
/// PATH_FIELD_LEN is the path content plus its terminator byte.
pub const PATH_FIELD_LEN: usize = PATH_LEN + 1;

pub const ID_OFFSET: usize = 0;
pub const PATH_OFFSET: usize = ID_OFFSET + 4;
pub const PARENT_OFFSET: usize = PATH_OFFSET + PATH_FIELD_LEN;
pub const SIZE_OFFSET: usize = PARENT_OFFSET + 4;
pub const KIND_OFFSET: usize = SIZE_OFFSET + 4;
pub const DATA_OFFSET_OFFSET: usize = KIND_OFFSET + 1;

/// RECORD_WIDTH is the byte size of one serialized record.
pub const RECORD_WIDTH: usize = DATA_OFFSET_OFFSET + 4;

/// SENTINEL_ID marks a free slot.
pub const SENTINEL_ID: u32 = 0;
/// ROOT_ID is the identifier written for the root directory by format.
pub const ROOT_ID: u32 = 1;
/// ROOT_PATH is the lookup key of the root directory.
pub const ROOT_PATH: &str = "/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_width_matches_field_layout() {
        assert_eq!(RECORD_WIDTH, 4 + PATH_FIELD_LEN + 4 + 4 + 1 + 4);
        assert_eq!(RECORD_WIDTH, 49);
    }

    #[test]
    fn default_metadata_region_is_slot_aligned() {
        assert_eq!(SLOT_CAPACITY * RECORD_WIDTH, 49_000);
    }

    #[test]
    fn root_path_fits_path_field() {
        assert!(ROOT_PATH.len() <= PATH_LEN);
        assert_ne!(ROOT_ID, SENTINEL_ID);
    }
}
