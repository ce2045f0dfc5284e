//! Patch application and inverse-patch generation.

use json_tree_pointer::{format_json_pointer, initial, Path, PathStep};

use crate::immutable::{delete_in, get_in, insert_at, set_in, PathError};
use crate::value::Json;

use super::codec::decode_patch;
use super::types::{PatchError, PatchOp, PatchResult};

/// Apply `ops` to `doc` in order, producing the updated document and the
/// revert patch that undoes the whole sequence.
///
/// Each operation's inverse is computed alongside the forward edit and
/// prepended to the revert list, so replaying `revert` as a single patch
/// undoes all effects in reverse chronological order. Any error rejects the
/// entire patch and returns the original document.
pub fn apply_patch(doc: &Json, ops: &[PatchOp]) -> PatchResult {
    let mut updated = doc.clone();
    let mut revert: Vec<PatchOp> = Vec::new();

    for op in ops {
        match apply_op(&updated, op) {
            Ok(outcome) => {
                updated = outcome.doc;
                let mut combined = outcome.revert;
                combined.append(&mut revert);
                revert = combined;
            }
            Err(error) => {
                return PatchResult {
                    doc: doc.clone(),
                    revert: Vec::new(),
                    error: Some(error),
                };
            }
        }
    }

    PatchResult {
        doc: updated,
        revert,
        error: None,
    }
}

/// Decode a wire-format patch (a JSON array of operation objects) and apply
/// it. An unknown or malformed operation rejects the whole patch exactly
/// like a failing `test` does.
pub fn apply_json(doc: &Json, patch: &serde_json::Value) -> PatchResult {
    match decode_patch(patch) {
        Ok(ops) => apply_patch(doc, &ops),
        Err(error) => PatchResult {
            doc: doc.clone(),
            revert: Vec::new(),
            error: Some(error),
        },
    }
}

struct OpOutcome {
    doc: Json,
    revert: Vec<PatchOp>,
}

fn apply_op(doc: &Json, op: &PatchOp) -> Result<OpOutcome, PatchError> {
    match op {
        PatchOp::Add { path, value } => add(doc, path, value.clone()),
        PatchOp::Remove { path } => remove(doc, path),
        PatchOp::Replace { path, value } => replace(doc, path, value.clone()),
        PatchOp::Copy { path, from } => {
            let value = get_value(doc, from)?.clone();
            add(doc, path, value)
        }
        PatchOp::Move { path, from } => move_value(doc, path, from),
        PatchOp::Test { path, value } => {
            test(doc, path, value)?;
            Ok(OpOutcome {
                doc: doc.clone(),
                revert: Vec::new(),
            })
        }
    }
}

fn get_value<'a>(doc: &'a Json, path: &[PathStep]) -> Result<&'a Json, PatchError> {
    get_in(doc, path)
        .ok_or_else(|| PatchError::Path(PathError::NotFound(format_json_pointer(path))))
}

fn add(doc: &Json, path: &Path, value: Json) -> Result<OpOutcome, PatchError> {
    let resolved = resolve_path_index(doc, path);
    let parent_is_array =
        !path.is_empty() && matches!(get_in(doc, &initial(path)), Some(Json::Array(_)));

    if parent_is_array {
        // inserted, shifting later elements; undone by removing at the
        // resolved index
        let updated = insert_at(doc, &resolved, value)?;
        Ok(OpOutcome {
            doc: updated,
            revert: vec![PatchOp::Remove { path: resolved }],
        })
    } else {
        let old = get_in(doc, &resolved).cloned();
        let updated = set_in(doc, &resolved, value)?;
        let revert = match old {
            // pre-existing key was overwritten
            Some(old_value) => vec![PatchOp::Replace {
                path: resolved,
                value: old_value,
            }],
            None => vec![PatchOp::Remove { path: resolved }],
        };
        Ok(OpOutcome {
            doc: updated,
            revert,
        })
    }
}

fn remove(doc: &Json, path: &Path) -> Result<OpOutcome, PatchError> {
    let old = get_value(doc, path)?.clone();
    let updated = delete_in(doc, path)?;
    Ok(OpOutcome {
        doc: updated,
        revert: vec![PatchOp::Add {
            path: path.clone(),
            value: old,
        }],
    })
}

fn replace(doc: &Json, path: &Path, value: Json) -> Result<OpOutcome, PatchError> {
    let old = get_value(doc, path)?.clone();
    let updated = set_in(doc, path, value)?;
    Ok(OpOutcome {
        doc: updated,
        revert: vec![PatchOp::Replace {
            path: path.clone(),
            value: old,
        }],
    })
}

fn move_value(doc: &Json, path: &Path, from: &Path) -> Result<OpOutcome, PatchError> {
    let overwritten = get_in(doc, path).cloned();
    let value = get_value(doc, from)?.clone();

    let removed = delete_in(doc, from)?;
    // the removal may have shifted array indices, so `-` (and the target
    // index in general) resolves against the post-removal tree
    let resolved = resolve_path_index(&removed, path);
    let parent_is_array =
        !resolved.is_empty() && matches!(get_in(&removed, &initial(&resolved)), Some(Json::Array(_)));

    let updated = if parent_is_array {
        insert_at(&removed, &resolved, value)?
    } else {
        set_in(&removed, &resolved, value)?
    };

    let mut revert = vec![PatchOp::Move {
        path: from.clone(),
        from: resolved.clone(),
    }];
    if let (Some(old_value), false) = (overwritten, parent_is_array) {
        // the move overwrote an existing object value: move back, then
        // restore what was overwritten
        revert.push(PatchOp::Add {
            path: resolved,
            value: old_value,
        });
    }

    Ok(OpOutcome {
        doc: updated,
        revert,
    })
}

fn test(doc: &Json, path: &Path, expected: &Json) -> Result<(), PatchError> {
    let actual = get_value(doc, path)?;
    if actual != expected {
        return Err(PatchError::TestFailed(format_json_pointer(path)));
    }
    Ok(())
}

/// Resolve a trailing `-` step ("append") to a concrete array index, and
/// normalize a digit final step to `Index` form when the parent is an array.
///
/// Resolution happens against the current state of the array within the
/// in-progress application, which matters when multiple operations touch
/// the same array.
pub fn resolve_path_index(doc: &Json, path: &[PathStep]) -> Path {
    let Some(last) = path.last() else {
        return path.to_vec();
    };
    let parent_path = initial(path);
    let Some(Json::Array(items)) = get_in(doc, &parent_path) else {
        return path.to_vec();
    };
    let index = if last.is_append() {
        Some(items.len())
    } else {
        last.as_index()
    };
    match index {
        Some(index) => {
            let mut resolved = parent_path;
            resolved.push(PathStep::Index(index));
            resolved
        }
        None => path.to_vec(),
    }
}
