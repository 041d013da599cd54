mod common;

use common::{collection, data_object, populated, CountingCatalog};
use metabridge_ops::{modify_metadata, search_metadata, SearchOptions};
use metabridge_store::SqliteCatalog;
use metabridge_types::{Avu, MetaError, MetadataOp};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// `populated()` with `study=A` on run1, run10, x.bam and z.bam, and
/// `type=bam` on x.bam only.
fn annotated() -> SqliteCatalog {
    let mut cat = populated();
    for entity in [
        collection("/zone/home/alice/run1"),
        collection("/zone/home/alice/run10"),
        data_object("/zone/home/alice/run1", "x.bam"),
        data_object("/zone/home/alice/run10", "z.bam"),
    ] {
        modify_metadata(&mut cat, &entity, MetadataOp::Add, &Avu::new("study", "A")).unwrap();
    }
    modify_metadata(
        &mut cat,
        &data_object("/zone/home/alice/run1", "x.bam"),
        MetadataOp::Add,
        &Avu::new("type", "bam"),
    )
    .unwrap();
    cat
}

fn avus(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| json!({"attribute": format!("a{i}"), "value": "v"}))
            .collect(),
    )
}

// ── Matching ─────────────────────────────────────────────────────

#[test]
fn collections_come_before_data_objects() {
    let mut cat = annotated();
    let query = json!({"avus": [{"attribute": "study", "value": "A"}]});
    assert_eq!(
        search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap(),
        json!([
            {"collection": "/zone/home/alice/run1"},
            {"collection": "/zone/home/alice/run10"},
            {"collection": "/zone/home/alice/run1", "data_object": "x.bam"},
            {"collection": "/zone/home/alice/run10", "data_object": "z.bam"}
        ])
    );
}

#[test]
fn every_avu_must_match() {
    let mut cat = annotated();
    let query = json!({"avus": [
        {"attribute": "study", "value": "A"},
        {"attribute": "type", "value": "bam"}
    ]});
    assert_eq!(
        search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap(),
        json!([{"collection": "/zone/home/alice/run1", "data_object": "x.bam"}])
    );
}

#[test]
fn operators_apply_to_values() {
    let mut cat = annotated();
    let query = json!({"avus": [{"attribute": "type", "value": "b%", "operator": "like"}]});
    assert_eq!(
        search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap(),
        json!([{"collection": "/zone/home/alice/run1", "data_object": "x.bam"}])
    );

    let query = json!({"avus": [{"attribute": "study", "value": "A", "operator": "!="}]});
    assert_eq!(
        search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap(),
        json!([])
    );
}

// ── Scope ────────────────────────────────────────────────────────

#[test]
fn collection_scope_excludes_prefix_siblings() {
    let mut cat = annotated();
    let query = json!({
        "avus": [{"attribute": "study", "value": "A"}],
        "collection": "/zone/home/alice/run1"
    });
    assert_eq!(
        search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap(),
        json!([
            {"collection": "/zone/home/alice/run1"},
            {"collection": "/zone/home/alice/run1", "data_object": "x.bam"}
        ])
    );
}

#[test]
fn trailing_separator_in_scope_is_ignored() {
    let mut cat = annotated();
    let query = json!({
        "avus": [{"attribute": "study", "value": "A"}],
        "collection": "/zone/home/alice/run10/"
    });
    assert_eq!(
        search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap(),
        json!([
            {"collection": "/zone/home/alice/run10"},
            {"collection": "/zone/home/alice/run10", "data_object": "z.bam"}
        ])
    );
}

#[test]
fn zone_hint_restricts_results() {
    let mut cat = annotated();
    let query = json!({"avus": [{"attribute": "study", "value": "A"}]});
    let elsewhere = SearchOptions::default().with_zone("other");
    assert_eq!(search_metadata(&mut cat, &query, &elsewhere).unwrap(), json!([]));

    let here = SearchOptions::default().with_zone("zone");
    assert_eq!(
        search_metadata(&mut cat, &query, &here)
            .unwrap()
            .as_array()
            .unwrap()
            .len(),
        4
    );
}

#[test]
fn max_rows_caps_each_kind() {
    let mut cat = annotated();
    let query = json!({"avus": [{"attribute": "study", "value": "A"}]});
    let options = SearchOptions::default().with_max_rows(1);
    assert_eq!(
        search_metadata(&mut cat, &query, &options).unwrap(),
        json!([
            {"collection": "/zone/home/alice/run1"},
            {"collection": "/zone/home/alice/run1", "data_object": "x.bam"}
        ])
    );
    assert_eq!(cat.open_cursors(), 0);
}

#[test]
fn prefix_siblings_do_not_use_up_max_rows() {
    let mut cat = SqliteCatalog::open_in_memory().unwrap();
    cat.create_collection("/z/bc").unwrap();
    cat.create_collection("/z/b").unwrap();
    for path in ["/z/bc/p", "/z/bc/q", "/z/b/x"] {
        cat.create_data_object(path).unwrap();
    }
    for (coll, name) in [("/z/bc", "p"), ("/z/bc", "q"), ("/z/b", "x")] {
        modify_metadata(
            &mut cat,
            &data_object(coll, name),
            MetadataOp::Add,
            &Avu::new("s", "A"),
        )
        .unwrap();
    }

    let query = json!({"avus": [{"attribute": "s", "value": "A"}], "collection": "/z/b"});
    let options = SearchOptions::default().with_max_rows(2);
    assert_eq!(
        search_metadata(&mut cat, &query, &options).unwrap(),
        json!([{"collection": "/z/b", "data_object": "x"}])
    );
    assert_eq!(cat.open_cursors(), 0);
}

#[test]
fn wildcards_in_scope_path_match_literally() {
    let mut cat = SqliteCatalog::open_in_memory().unwrap();
    for path in ["/z/a_b/x", "/z/axb/y"] {
        cat.create_collection(path.rsplit_once('/').unwrap().0).unwrap();
        cat.create_data_object(path).unwrap();
    }
    for (coll, name) in [("/z/a_b", "x"), ("/z/axb", "y")] {
        modify_metadata(
            &mut cat,
            &data_object(coll, name),
            MetadataOp::Add,
            &Avu::new("s", "A"),
        )
        .unwrap();
    }

    let query = json!({"avus": [{"attribute": "s", "value": "A"}], "collection": "/z/a_b"});
    assert_eq!(
        search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap(),
        json!([{"collection": "/z/a_b", "data_object": "x"}])
    );
}

// ── Validation ───────────────────────────────────────────────────

#[test]
fn ten_avus_fit_eleven_do_not() {
    let mut cat = CountingCatalog::new(populated());
    let options = SearchOptions::default();

    assert!(search_metadata(&mut cat, &json!({"avus": avus(10)}), &options).is_ok());

    let calls = cat.total();
    let err = search_metadata(&mut cat, &json!({"avus": avus(11)}), &options).unwrap_err();
    assert!(matches!(
        err,
        MetaError::TooManyConditionals { requested: 22, limit: 20 }
    ));
    assert_eq!(cat.total(), calls);
}

#[test]
fn scope_counts_toward_the_limit() {
    let mut cat = CountingCatalog::new(populated());
    let query = json!({"avus": avus(10), "collection": "/zone"});
    let err = search_metadata(&mut cat, &query, &SearchOptions::default()).unwrap_err();
    assert!(matches!(err, MetaError::TooManyConditionals { requested: 21, .. }));
    assert_eq!(cat.total(), 0);
}

#[test]
fn malformed_queries_are_rejected() {
    let mut cat = CountingCatalog::new(populated());
    let options = SearchOptions::default();
    let cases = [
        json!({}),
        json!({"avus": []}),
        json!({"avus": "study"}),
        json!({"avus": [{"attribute": "study"}]}),
        json!({"avus": [{"attribute": "s", "value": "A", "operator": "regex"}]}),
        json!({"avus": [{"attribute": "s", "value": "A"}], "collection": 3}),
        json!("study=A"),
    ];
    for query in cases {
        let err = search_metadata(&mut cat, &query, &options).unwrap_err();
        assert!(err.is_validation(), "{query}: {err}");
    }
    assert_eq!(cat.total(), 0);
}
