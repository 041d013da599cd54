use metabridge_query::rows_to_json;
use metabridge_types::MetaError;
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;
use common::row;

#[test]
fn rows_become_labelled_objects_in_order() {
    let rows = vec![row(&["a", "1"]), row(&["b", "2"])];
    assert_eq!(
        rows_to_json(&rows, &["attribute", "value"]).unwrap(),
        json!([
            {"attribute": "a", "value": "1"},
            {"attribute": "b", "value": "2"}
        ])
    );
}

#[test]
fn no_rows_is_empty_array() {
    let rows: Vec<Vec<String>> = Vec::new();
    assert_eq!(rows_to_json(&rows, &["attribute"]).unwrap(), json!([]));
}

#[test]
fn short_row_is_internal_fault() {
    let rows = vec![row(&["a", "1"]), row(&["b"])];
    let err = rows_to_json(&rows, &["attribute", "value"]).unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(err, MetaError::InternalConsistencyFault(msg) if msg.contains("row 1")));
}

#[test]
fn wide_row_is_internal_fault() {
    let rows = vec![row(&["a", "1", "x"])];
    assert!(matches!(
        rows_to_json(&rows, &["attribute", "value"]),
        Err(MetaError::InternalConsistencyFault(_))
    ));
}
