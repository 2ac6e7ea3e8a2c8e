use super::*;
use crate::types::content::Content;
use crate::types::entry::DiskId;

#[test]
fn record_v1_serialization() {
    let original = v1::Record::Create {
        disk_id: DiskId(7),
        content: Content::text("Hello, World!").unwrap(),
        favorite: true,
    };

    let versioned = VersionedRecord::V1(original.clone());
    let bytes = <VersionedRecord as redb::Value>::as_bytes(&versioned);
    assert_eq!(bytes[0], v1::VERSION);

    let deserialized = <VersionedRecord as redb::Value>::from_bytes(&bytes);
    assert_eq!(deserialized.version(), v1::VERSION);

    let record = deserialized.into_latest();
    assert_eq!(record, original);
    assert_eq!(record.disk_id(), DiskId(7));
}

#[test]
#[should_panic(expected = "unsupported record version")]
fn unknown_version_is_a_hard_failure() {
    let _ = <VersionedRecord as redb::Value>::from_bytes(&[99, 0, 0]);
}

#[test]
#[should_panic(expected = "invalid record")]
fn unknown_content_kind_is_a_hard_failure() {
    // Create, disk id 1, content variant 5 (no such kind).
    let _ = <VersionedRecord as redb::Value>::from_bytes(&[v1::VERSION, 0, 1, 5]);
}
