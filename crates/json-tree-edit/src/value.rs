//! The JSON value model.
//!
//! Documents are recursive [`Json`] values whose children are held behind
//! `Rc`, so edits copy only the spine from the root down to the edited node
//! and share every untouched subtree with the previous document version.
//! Object key order is semantically meaningful and preserved (`IndexMap`).

use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use json_tree_pointer::{parse_json_pointer, Path, PathStep};

/// A JSON value with structural sharing between document versions.
#[derive(Debug, Clone, PartialEq)]
pub enum Json {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Rc<Json>>),
    Object(IndexMap<String, Rc<Json>>),
}

impl Json {
    /// Parse a JSON text into a document.
    pub fn parse(text: &str) -> serde_json::Result<Json> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Json::from(value))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Json::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Json::Array(_))
    }

    /// True for objects and arrays: the nodes that can be expanded/collapsed.
    pub fn is_container(&self) -> bool {
        matches!(self, Json::Array(_) | Json::Object(_))
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Rc<Json>>> {
        match self {
            Json::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Rc<Json>>> {
        match self {
            Json::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Json::Null => "null",
            Json::Bool(_) => "boolean",
            Json::Number(_) => "number",
            Json::String(_) => "string",
            Json::Array(_) => "array",
            Json::Object(_) => "object",
        }
    }

    /// Follow a single path step into this value.
    ///
    /// Lookups are forgiving about the step flavor: an `Index` step addresses
    /// the object key `"0"`, and a digit `Key` step addresses array index 0,
    /// so wire-parsed paths resolve without prior canonicalization.
    pub fn get_step(&self, step: &PathStep) -> Option<&Json> {
        match self {
            Json::Object(map) => map.get(step.as_key().as_ref()).map(Rc::as_ref),
            Json::Array(items) => step
                .as_index()
                .and_then(|index| items.get(index))
                .map(Rc::as_ref),
            _ => None,
        }
    }

    /// Serialize to text with the given indentation; `indent == 0` is compact.
    pub fn stringify(&self, indent: usize) -> String {
        if indent == 0 {
            return serde_json::to_string(self).expect("JSON serialization does not fail");
        }
        let indent_str = " ".repeat(indent);
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent_str.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .expect("JSON serialization does not fail");
        String::from_utf8(buf).expect("serializer emits UTF-8")
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Json {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Number(n) => Json::Number(n),
            Value::String(s) => Json::String(s),
            Value::Array(items) => {
                Json::Array(items.into_iter().map(|v| Rc::new(Json::from(v))).collect())
            }
            Value::Object(map) => Json::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Rc::new(Json::from(v))))
                    .collect(),
            ),
        }
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.clone()),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => {
                Value::Array(items.iter().map(|item| Value::from(item.as_ref())).collect())
            }
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_ref())))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Json {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Json::Null => serializer.serialize_unit(),
            Json::Bool(b) => serializer.serialize_bool(*b),
            Json::Number(n) => n.serialize(serializer),
            Json::String(s) => serializer.serialize_str(s),
            Json::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item.as_ref())?;
                }
                seq.end()
            }
            Json::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    m.serialize_entry(key, value.as_ref())?;
                }
                m.end()
            }
        }
    }
}

/// Rewrite a path into canonical form against a document: a step becomes
/// `Index` exactly where its container is an array.
///
/// Steps past the point where the document ends are left as-is.
pub fn canonicalize_path(doc: &Json, path: &[PathStep]) -> Path {
    let mut canonical = Path::with_capacity(path.len());
    let mut current = Some(doc);
    for step in path {
        let step = match current {
            Some(Json::Array(_)) => match step.as_index() {
                Some(index) => PathStep::Index(index),
                None => step.clone(),
            },
            _ => step.clone(),
        };
        current = current.and_then(|node| node.get_step(&step));
        canonical.push(step);
    }
    canonical
}

/// Parse a pointer string and resolve its array indices against a document.
pub fn parse_path_with_indices(doc: &Json, pointer: &str) -> Path {
    canonicalize_path(doc, &parse_json_pointer(pointer))
}
