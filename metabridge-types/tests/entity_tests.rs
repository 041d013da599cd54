use metabridge_types::{
    collection_path_to_json, entity_to_json, json_to_path, path_to_json, Entity, EntityKind,
    MetaError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── json_to_path ─────────────────────────────────────────────────

#[test]
fn data_object_path_is_joined_with_one_separator() {
    let j = json!({"collection": "/zone/home/user", "data_object": "file.txt"});
    assert_eq!(json_to_path(&j).unwrap(), "/zone/home/user/file.txt");
}

#[test]
fn trailing_separator_is_not_doubled() {
    let j = json!({"collection": "/zone/home/user/", "data_object": "file.txt"});
    assert_eq!(json_to_path(&j).unwrap(), "/zone/home/user/file.txt");
}

#[test]
fn collection_only_returns_collection() {
    let j = json!({"collection": "/zone/home/user"});
    assert_eq!(json_to_path(&j).unwrap(), "/zone/home/user");
}

#[test]
fn missing_collection_fails() {
    let j = json!({"data_object": "file.txt"});
    assert!(matches!(json_to_path(&j), Err(MetaError::MissingField(f)) if f == "collection"));
}

#[test]
fn non_string_collection_fails() {
    let j = json!({"collection": ["/zone"]});
    assert!(matches!(
        json_to_path(&j),
        Err(MetaError::InvalidType { field, .. }) if field == "collection"
    ));
}

#[test]
fn non_object_input_fails() {
    assert!(matches!(
        json_to_path(&json!("/zone/home")),
        Err(MetaError::InvalidType { .. })
    ));
}

// ── path_to_json ─────────────────────────────────────────────────

#[test]
fn data_object_path_splits_at_last_separator() {
    assert_eq!(
        path_to_json("/zone/home/user/file.txt"),
        json!({"collection": "/zone/home/user", "data_object": "file.txt"})
    );
}

#[test]
fn data_object_in_root_collection() {
    let j = path_to_json("/file.txt");
    assert_eq!(j, json!({"collection": "/", "data_object": "file.txt"}));
    assert_eq!(json_to_path(&j).unwrap(), "/file.txt");
}

#[test]
fn collection_path_json() {
    assert_eq!(
        collection_path_to_json("/zone/home"),
        json!({"collection": "/zone/home"})
    );
}

#[test]
fn round_trip_from_json() {
    let j = json!({"collection": "/zone/home/user", "data_object": "file.txt"});
    let path = json_to_path(&j).unwrap();
    assert_eq!(path_to_json(&path), j);
}

// ── Entity ───────────────────────────────────────────────────────

#[test]
fn entity_kind_and_accessors() {
    let obj = Entity::data_object("/zone/a", "x.bam");
    assert_eq!(obj.kind(), EntityKind::DataObject);
    assert_eq!(obj.collection_name(), "/zone/a");
    assert_eq!(obj.data_object_name(), Some("x.bam"));
    assert_eq!(obj.path(), "/zone/a/x.bam");
    assert_eq!(obj.to_string(), "/zone/a/x.bam");

    let coll = Entity::collection("/zone/a");
    assert!(coll.is_collection());
    assert_eq!(coll.data_object_name(), None);
}

#[test]
fn entity_json_round_trip() {
    for entity in [
        Entity::collection("/zone/a"),
        Entity::data_object("/zone/a", "x.bam"),
    ] {
        let j = entity_to_json(&entity);
        assert_eq!(Entity::from_json(&j).unwrap(), entity);
    }
}

#[test]
fn from_data_object_path() {
    assert_eq!(
        Entity::from_data_object_path("/zone/a/b.txt"),
        Entity::data_object("/zone/a", "b.txt")
    );
}
