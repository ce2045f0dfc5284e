//! Immutability helpers: structural-sharing get/set/insert/delete by path.
//!
//! Every write operation returns a new document root. Only the spine from
//! the root to the edited node is copied; sibling subtrees are reused by
//! `Rc` ownership, never deep-cloned.

use std::rc::Rc;

use thiserror::Error;

use json_tree_pointer::PathStep;

use crate::value::Json;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path not found at step {0:?}")]
    NotFound(String),
    #[error("invalid array index {0:?}")]
    InvalidIndex(String),
    #[error("cannot address a child of a {0} value")]
    NotAContainer(&'static str),
}

/// Get a reference to the nested value at `path`.
///
/// Returns `None` when the path does not exist. An explicit `null` in the
/// document does exist and is returned.
pub fn get_in<'a>(doc: &'a Json, path: &[PathStep]) -> Option<&'a Json> {
    let mut current = doc;
    for step in path {
        current = current.get_step(step)?;
    }
    Some(current)
}

/// Check whether a nested value exists at `path`.
pub fn exists_in(doc: &Json, path: &[PathStep]) -> bool {
    get_in(doc, path).is_some()
}

/// Return a new document with `value` placed at `path`.
///
/// Intermediate steps must exist. The final step may create a new object
/// key; an array index must address an existing element.
pub fn set_in(doc: &Json, path: &[PathStep], value: Json) -> Result<Json, PathError> {
    let Some((step, rest)) = path.split_first() else {
        return Ok(value);
    };
    match doc {
        Json::Object(map) => {
            let key = step.as_key().into_owned();
            let child = if rest.is_empty() {
                value
            } else {
                let existing = map
                    .get(&key)
                    .ok_or_else(|| PathError::NotFound(key.clone()))?;
                set_in(existing, rest, value)?
            };
            let mut updated = map.clone();
            updated.insert(key, Rc::new(child));
            Ok(Json::Object(updated))
        }
        Json::Array(items) => {
            let index = step
                .as_index()
                .ok_or_else(|| PathError::InvalidIndex(step.to_string()))?;
            if index >= items.len() {
                return Err(PathError::NotFound(step.to_string()));
            }
            let child = if rest.is_empty() {
                value
            } else {
                set_in(&items[index], rest, value)?
            };
            let mut updated = items.clone();
            updated[index] = Rc::new(child);
            Ok(Json::Array(updated))
        }
        _ => Err(PathError::NotAContainer(doc.type_name())),
    }
}

/// Return a new document with `value` inserted into the array addressed by
/// the parent of `path`, at the index of the final step. Later elements
/// shift right. The index may equal the array length (append).
pub fn insert_at(doc: &Json, path: &[PathStep], value: Json) -> Result<Json, PathError> {
    let Some((step, rest)) = path.split_first() else {
        return Err(PathError::NotAContainer(doc.type_name()));
    };
    match doc {
        Json::Array(items) if rest.is_empty() => {
            let index = step
                .as_index()
                .ok_or_else(|| PathError::InvalidIndex(step.to_string()))?;
            if index > items.len() {
                return Err(PathError::NotFound(step.to_string()));
            }
            let mut updated = items.clone();
            updated.insert(index, Rc::new(value));
            Ok(Json::Array(updated))
        }
        Json::Array(items) => {
            let index = step
                .as_index()
                .ok_or_else(|| PathError::InvalidIndex(step.to_string()))?;
            let child = items
                .get(index)
                .ok_or_else(|| PathError::NotFound(step.to_string()))?;
            let updated_child = insert_at(child, rest, value)?;
            let mut updated = items.clone();
            updated[index] = Rc::new(updated_child);
            Ok(Json::Array(updated))
        }
        Json::Object(map) if !rest.is_empty() => {
            let key = step.as_key().into_owned();
            let child = map
                .get(&key)
                .ok_or_else(|| PathError::NotFound(key.clone()))?;
            let updated_child = insert_at(child, rest, value)?;
            let mut updated = map.clone();
            updated.insert(key, Rc::new(updated_child));
            Ok(Json::Object(updated))
        }
        Json::Object(_) => Err(PathError::NotAContainer("object")),
        _ => Err(PathError::NotAContainer(doc.type_name())),
    }
}

/// Return a new document with the value at `path` removed.
pub fn delete_in(doc: &Json, path: &[PathStep]) -> Result<Json, PathError> {
    let Some((step, rest)) = path.split_first() else {
        return Err(PathError::NotFound(String::new()));
    };
    match doc {
        Json::Object(map) => {
            let key = step.as_key().into_owned();
            if rest.is_empty() {
                let mut updated = map.clone();
                updated
                    .shift_remove(&key)
                    .ok_or_else(|| PathError::NotFound(key.clone()))?;
                Ok(Json::Object(updated))
            } else {
                let child = map
                    .get(&key)
                    .ok_or_else(|| PathError::NotFound(key.clone()))?;
                let updated_child = delete_in(child, rest)?;
                let mut updated = map.clone();
                updated.insert(key, Rc::new(updated_child));
                Ok(Json::Object(updated))
            }
        }
        Json::Array(items) => {
            let index = step
                .as_index()
                .ok_or_else(|| PathError::InvalidIndex(step.to_string()))?;
            if index >= items.len() {
                return Err(PathError::NotFound(step.to_string()));
            }
            let mut updated = items.clone();
            if rest.is_empty() {
                updated.remove(index);
            } else {
                updated[index] = Rc::new(delete_in(&items[index], rest)?);
            }
            Ok(Json::Array(updated))
        }
        _ => Err(PathError::NotAContainer(doc.type_name())),
    }
}
