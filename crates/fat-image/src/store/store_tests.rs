use super::*;
use crate::record::EntryKind;
use crate::test_utils::{SMALL_SLOTS, small_config, temp_config};

fn sample_records() -> Vec<FileRecord> {
    vec![
        FileRecord::root(),
        FileRecord::directory(2, "/a", 1),
        FileRecord::file(3, "/a/f.txt", 2, 3, 0),
        FileRecord::file(4, "/a/g.txt", 2, 5, 3),
    ]
}

#[test]
fn initialize_writes_only_root() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config.clone());

    store.initialize().expect("initialize");

    let records = store.load().expect("load");
    assert_eq!(records, vec![FileRecord::root()]);
    let len = std::fs::metadata(&config.path).expect("metadata").len();
    assert_eq!(len, config.layout().total_len());
}

#[test]
fn save_then_load_preserves_slot_order() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");

    let mut records = sample_records();
    records.swap(1, 3);
    store.save(&records).expect("save");

    assert_eq!(store.load().expect("load"), records);
}

#[test]
fn save_overwrites_instead_of_appending() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");
    store.save(&sample_records()).expect("save full");

    let shorter = vec![FileRecord::root(), FileRecord::directory(5, "/b", 1)];
    store.save(&shorter).expect("save shorter");

    assert_eq!(store.load().expect("load"), shorter);
}

#[test]
fn save_leaves_data_region_untouched() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");
    store.write_data(0, b"payload").expect("write data");

    store.save(&sample_records()).expect("save");

    assert_eq!(store.read_data(0, 7).expect("read data"), b"payload");
}

#[test]
fn save_rejects_more_records_than_slots() {
    let (_dir, config) = small_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");

    let too_many: Vec<_> = (1..=SMALL_SLOTS as u32 + 1)
        .map(|id| FileRecord::directory(id, format!("/d{id}"), 1))
        .collect();

    let err = store.save(&too_many).unwrap_err();
    assert!(matches!(err, FsError::TableFull { capacity } if capacity == SMALL_SLOTS));
    assert_eq!(store.load().expect("load"), vec![FileRecord::root()]);
}

#[test]
fn save_fills_every_slot() {
    let (_dir, config) = small_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");

    let full: Vec<_> = (1..=SMALL_SLOTS as u32)
        .map(|id| FileRecord::directory(id, format!("/d{id}"), 0))
        .collect();
    store.save(&full).expect("save");

    assert_eq!(store.load().expect("load").len(), SMALL_SLOTS);
}

#[test]
fn load_missing_image_is_storage_unavailable() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config);

    assert!(matches!(
        store.load(),
        Err(FsError::StorageUnavailable { .. })
    ));
    assert!(matches!(
        store.save(&[FileRecord::root()]),
        Err(FsError::StorageUnavailable { .. })
    ));
}

#[test]
fn load_truncated_metadata_is_corrupt() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config.clone());
    store.initialize().expect("initialize");

    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&config.path)
        .expect("open");
    file.set_len(config.layout().metadata_len() - 1).expect("truncate");

    assert!(matches!(store.load(), Err(FsError::CorruptTable(_))));
}

#[test]
fn load_rejects_duplicate_identifiers() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");

    store
        .save(&[FileRecord::root(), FileRecord::directory(1, "/dup", 1)])
        .expect("save");

    assert!(matches!(store.load(), Err(FsError::CorruptTable(_))));
}

#[test]
fn load_rejects_file_past_data_region() {
    let (_dir, config) = small_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");

    store
        .save(&[FileRecord::root(), FileRecord::file(2, "/big", 1, 60, 10)])
        .expect("save");

    assert!(matches!(store.load(), Err(FsError::CorruptTable(_))));
}

#[test]
fn load_skips_sentinel_slots_between_live_records() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config.clone());
    store.initialize().expect("initialize");

    let mut image = ImageFile::open_write(&config.path).expect("open");
    let layout = config.layout();
    image.write_at(layout.slot_offset(5), &FileRecord::directory(9, "/gap", 1).encode());
    image.flush().expect("flush");
    drop(image);

    let records = store.load().expect("load");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].path, "/gap");
    assert_eq!(records[1].kind, EntryKind::Directory);
}

#[test]
fn initialize_wipes_previous_content() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");
    store.save(&sample_records()).expect("save");
    store.write_data(10, &[0xEE; 32]).expect("write data");

    store.initialize().expect("reinitialize");

    assert_eq!(store.load().expect("load"), vec![FileRecord::root()]);
    assert_eq!(store.read_data(10, 32).expect("read data"), vec![0u8; 32]);
}

#[test]
fn write_data_rejects_overflow() {
    let (_dir, config) = small_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");

    let err = store.write_data(60, &[1u8; 5]).unwrap_err();
    assert!(matches!(
        err,
        FsError::NoSpace {
            requested: 5,
            available: 4
        }
    ));
    store.write_data(60, &[1u8; 4]).expect("exact fit");
}

#[test]
fn read_data_rejects_range_past_region() {
    let (_dir, config) = small_config();
    let store = TableStore::new(config);
    store.initialize().expect("initialize");

    assert!(matches!(
        store.read_data(60, 5),
        Err(FsError::CorruptTable(_))
    ));
}

#[test]
fn initialize_rejects_invalid_config() {
    let (_dir, config) = temp_config();
    let store = TableStore::new(config.clone().with_slot_capacity(0));

    assert!(matches!(store.initialize(), Err(FsError::InvalidConfig(_))));
    assert!(!config.path.exists());
}
