//! End-to-end patch workflows: apply, revert, replay, wire round-trips.

use serde_json::json;

use json_tree_edit::patch::{decode_patch, encode_patch};
use json_tree_edit::{apply_json, apply_patch, Json, PatchOp};

fn doc(value: serde_json::Value) -> Json {
    Json::parse(&value.to_string()).expect("valid JSON")
}

#[test]
fn edit_session_with_undo() {
    let original = doc(json!({
        "name": "Jo",
        "address": {"city": "Rotterdam", "street": "Main st"},
        "scores": [5, 7, 9]
    }));

    // a few user edits, applied one patch at a time, reverts stacked up
    let edits = vec![
        decode_patch(&json!([{"op": "replace", "path": "/name", "value": "Joanna"}])).unwrap(),
        decode_patch(&json!([{"op": "add", "path": "/scores/-", "value": 10}])).unwrap(),
        decode_patch(&json!([{"op": "remove", "path": "/address/street"}])).unwrap(),
        decode_patch(&json!([{"op": "move", "path": "/city", "from": "/address/city"}])).unwrap(),
    ];

    let mut current = original.clone();
    let mut undo_stack: Vec<Vec<PatchOp>> = Vec::new();
    for ops in edits {
        let result = apply_patch(&current, &ops);
        assert_eq!(result.error, None);
        undo_stack.push(result.revert);
        current = result.doc;
    }

    assert_eq!(
        current,
        doc(json!({
            "name": "Joanna",
            "address": {},
            "scores": [5, 7, 9, 10],
            "city": "Rotterdam"
        }))
    );

    // unwind the whole session
    while let Some(revert) = undo_stack.pop() {
        let result = apply_patch(&current, &revert);
        assert_eq!(result.error, None);
        current = result.doc;
    }
    assert_eq!(current, original);
}

#[test]
fn revert_of_a_revert_replays_the_edit() {
    let base = doc(json!({"items": [1, 2, 3]}));
    let ops = decode_patch(&json!([
        {"op": "move", "path": "/items/0", "from": "/items/2"},
        {"op": "replace", "path": "/items/1", "value": 99}
    ]))
    .unwrap();

    let forward = apply_patch(&base, &ops);
    assert_eq!(forward.error, None);
    assert_eq!(forward.doc, doc(json!({"items": [3, 99, 2]})));

    let backward = apply_patch(&forward.doc, &forward.revert);
    assert_eq!(backward.doc, base);

    // and the revert's revert lands on the edited document again
    let replayed = apply_patch(&backward.doc, &backward.revert);
    assert_eq!(replayed.doc, forward.doc);
}

#[test]
fn failing_test_rejects_the_whole_patch() {
    let base = doc(json!({"version": 2, "data": {"a": 1}}));
    let result = apply_json(
        &base,
        &json!([
            {"op": "replace", "path": "/data/a", "value": 42},
            {"op": "test", "path": "/version", "value": 1},
            {"op": "remove", "path": "/data"}
        ]),
    );
    assert!(result.error.is_some());
    assert_eq!(result.doc, base);
    assert!(result.revert.is_empty());
}

#[test]
fn malformed_wire_patch_rejects_without_touching_the_document() {
    let base = doc(json!({"a": 1}));

    let unknown = apply_json(&base, &json!([{"op": "rename", "path": "/a"}]));
    assert!(unknown.error.is_some());
    assert_eq!(unknown.doc, base);

    let missing_value = apply_json(&base, &json!([{"op": "add", "path": "/b"}]));
    assert!(missing_value.error.is_some());
    assert_eq!(missing_value.doc, base);
}

#[test]
fn revert_patch_round_trips_over_the_wire() {
    let base = doc(json!({"a/b": {"x~y": 1}, "list": [true, null]}));
    let ops = decode_patch(&json!([
        {"op": "remove", "path": "/a~1b/x~0y"},
        {"op": "add", "path": "/list/-", "value": "end"}
    ]))
    .unwrap();

    let result = apply_patch(&base, &ops);
    assert_eq!(result.error, None);

    // serialize the revert, hand it to "another process", decode, apply
    let wire = encode_patch(&result.revert);
    let revert = decode_patch(&wire).unwrap();
    let restored = apply_patch(&result.doc, &revert);
    assert_eq!(restored.doc, base);
}

#[test]
fn untouched_subtrees_are_shared_across_an_edit() {
    use std::rc::Rc;

    let base = doc(json!({
        "big": {"untouched": [1, 2, 3, {"deep": true}]},
        "small": 1
    }));
    let result = apply_json(&base, &json!([{"op": "replace", "path": "/small", "value": 2}]));
    assert_eq!(result.error, None);

    let before = base.as_object().unwrap().get("big").unwrap();
    let after = result.doc.as_object().unwrap().get("big").unwrap();
    assert!(Rc::ptr_eq(before, after));
}
