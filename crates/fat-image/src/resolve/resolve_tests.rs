use super::*;

fn table() -> Vec<FileRecord> {
    vec![
        FileRecord::root(),
        FileRecord::directory(2, "/a", 1),
        FileRecord::directory(3, "/b", 1),
        FileRecord::file(4, "/a/f.txt", 2, 3, 0),
        FileRecord::directory(5, "/a/sub", 2),
        FileRecord::file(6, "/a/sub/g.txt", 5, 2, 3),
    ]
}

#[test]
fn find_by_path_matches_whole_strings_only() {
    let records = table();

    assert_eq!(find_by_path(&records, "/a").map(|r| r.identifier), Some(2));
    assert!(find_by_path(&records, "/a/").is_none());
    assert!(find_by_path(&records, "a").is_none());
    assert!(find_by_path(&records, "/a/f").is_none());
}

#[test]
fn find_by_path_returns_first_match() {
    let mut records = table();
    records.push(FileRecord::directory(9, "/a", 1));

    assert_eq!(find_by_path(&records, "/a").map(|r| r.identifier), Some(2));
}

#[test]
fn identifier_of_reports_absence_as_none() {
    let records = table();

    assert_eq!(identifier_of(&records, "/"), Some(1));
    assert_eq!(identifier_of(&records, "/a/f.txt"), Some(4));
    assert_eq!(identifier_of(&records, "/missing"), None);
}

#[test]
fn identifier_of_never_yields_sentinel() {
    let records = vec![FileRecord::directory(SENTINEL_ID, "/ghost", 1)];

    assert_eq!(identifier_of(&records, "/ghost"), None);
}

#[test]
fn slot_position_counts_live_records() {
    let records = table();

    assert_eq!(slot_position_of(&records, 1), Some(0));
    assert_eq!(slot_position_of(&records, 5), Some(4));
    assert_eq!(slot_position_of(&records, 42), None);
    assert_eq!(slot_position_of(&records, SENTINEL_ID), None);
}

#[test]
fn children_are_listed_in_table_order() {
    let records = table();

    let under_root: Vec<_> = children_of(&records, 1).map(|r| r.path.as_str()).collect();
    assert_eq!(under_root, vec!["/a", "/b"]);
    let under_a: Vec<_> = children_of(&records, 2).map(|r| r.path.as_str()).collect();
    assert_eq!(under_a, vec!["/a/f.txt", "/a/sub"]);
    assert_eq!(children_of(&records, 3).count(), 0);
}

#[test]
fn descendants_walk_the_whole_subtree() {
    let records = table();

    let mut below_a = descendants_of(&records, 2);
    below_a.sort_unstable();
    assert_eq!(below_a, vec![4, 5, 6]);
    assert!(descendants_of(&records, 3).is_empty());
    assert_eq!(descendants_of(&records, 1).len(), 5);
}

#[test]
fn descendants_stop_on_parent_cycles() {
    let records = vec![
        FileRecord::directory(2, "/x", 3),
        FileRecord::directory(3, "/y", 2),
    ];

    assert_eq!(descendants_of(&records, 2), vec![3]);
}
