//! Wire format for patch operations.
//!
//! Operations travel as JSON objects `{op, path, from?, value?}` with
//! `path`/`from` in RFC 6901 pointer syntax (`~0`/`~1` escaping, `-` as a
//! trailing append index). Round-trips with any standard JSON-Patch
//! consumer.

use serde_json::{json, Value};

use json_tree_pointer::{format_json_pointer, parse_json_pointer, Path};

use crate::value::Json;

use super::types::{PatchError, PatchOp};

/// Decode one wire operation.
pub fn decode_op(value: &Value) -> Result<PatchOp, PatchError> {
    let obj = value
        .as_object()
        .ok_or_else(|| PatchError::Malformed("operation must be an object".into()))?;
    let op = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::Malformed("property \"op\" must be a string".into()))?;
    let path = decode_pointer(obj.get("path"), "path")?;

    match op {
        "add" => Ok(PatchOp::Add {
            path,
            value: required_value(obj, "add")?,
        }),
        "remove" => Ok(PatchOp::Remove { path }),
        "replace" => Ok(PatchOp::Replace {
            path,
            value: required_value(obj, "replace")?,
        }),
        "copy" => Ok(PatchOp::Copy {
            path,
            from: required_from(obj, "copy")?,
        }),
        "move" => Ok(PatchOp::Move {
            path,
            from: required_from(obj, "move")?,
        }),
        "test" => Ok(PatchOp::Test {
            path,
            value: required_value(obj, "test")?,
        }),
        other => Err(PatchError::UnknownOp(other.to_string())),
    }
}

/// Decode a wire patch: a JSON array of operation objects.
pub fn decode_patch(patch: &Value) -> Result<Vec<PatchOp>, PatchError> {
    let ops = patch
        .as_array()
        .ok_or_else(|| PatchError::Malformed("patch must be an array of operations".into()))?;
    ops.iter().map(decode_op).collect()
}

/// Encode one operation into its wire form.
pub fn encode_op(op: &PatchOp) -> Value {
    match op {
        PatchOp::Add { path, value } => json!({
            "op": "add",
            "path": format_json_pointer(path),
            "value": Value::from(value),
        }),
        PatchOp::Remove { path } => json!({
            "op": "remove",
            "path": format_json_pointer(path),
        }),
        PatchOp::Replace { path, value } => json!({
            "op": "replace",
            "path": format_json_pointer(path),
            "value": Value::from(value),
        }),
        PatchOp::Copy { path, from } => json!({
            "op": "copy",
            "path": format_json_pointer(path),
            "from": format_json_pointer(from),
        }),
        PatchOp::Move { path, from } => json!({
            "op": "move",
            "path": format_json_pointer(path),
            "from": format_json_pointer(from),
        }),
        PatchOp::Test { path, value } => json!({
            "op": "test",
            "path": format_json_pointer(path),
            "value": Value::from(value),
        }),
    }
}

/// Encode a whole patch into its wire form.
pub fn encode_patch(ops: &[PatchOp]) -> Value {
    Value::Array(ops.iter().map(encode_op).collect())
}

fn decode_pointer(value: Option<&Value>, property: &str) -> Result<Path, PatchError> {
    let pointer = value
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::Malformed(format!("property {property:?} must be a string")))?;
    Ok(parse_json_pointer(pointer))
}

fn required_value(obj: &serde_json::Map<String, Value>, op: &str) -> Result<Json, PatchError> {
    obj.get("value")
        .cloned()
        .map(Json::from)
        .ok_or_else(|| PatchError::Malformed(format!("property \"value\" expected in {op} operation")))
}

fn required_from(obj: &serde_json::Map<String, Value>, op: &str) -> Result<Path, PatchError> {
    let pointer = obj
        .get("from")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::Malformed(format!("property \"from\" expected in {op} operation")))?;
    Ok(parse_json_pointer(pointer))
}
