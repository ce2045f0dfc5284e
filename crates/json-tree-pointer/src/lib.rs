//! JSON Pointer (RFC 6901) path algebra.
//!
//! Pure functions over ordered sequences of keys and indices ("paths"):
//! escaping, pointer parse/format, prefix tests, and shared-prefix
//! computation. The editor core addresses every node in a document through
//! these paths.
//!
//! # Example
//!
//! ```
//! use json_tree_pointer::{parse_json_pointer, format_json_pointer, PathStep};
//!
//! let path = parse_json_pointer("/foo/bar");
//! assert_eq!(path, vec![PathStep::from("foo"), PathStep::from("bar")]);
//! assert_eq!(format_json_pointer(&path), "/foo/bar");
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// # Example
///
/// ```
/// use json_tree_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("no-escapes"), "no-escapes");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// Per RFC 6901, `/` is replaced with `~1` and `~` is replaced with `~0`.
///
/// # Example
///
/// ```
/// use json_tree_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into path steps.
///
/// The empty string is the root path. Every component parses as a
/// [`PathStep::Key`]; resolving digit components against array containers
/// is document-aware and lives in the editor core.
///
/// # Example
///
/// ```
/// use json_tree_pointer::{parse_json_pointer, PathStep};
///
/// assert_eq!(parse_json_pointer(""), Vec::<PathStep>::new());
/// assert_eq!(
///     parse_json_pointer("/a~0b/c~1d"),
///     vec![PathStep::from("a~b"), PathStep::from("c/d")]
/// );
/// ```
pub fn parse_json_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer[1..]
        .split('/')
        .map(|component| PathStep::Key(unescape_component(component)))
        .collect()
}

/// Format path steps into a JSON Pointer string.
///
/// Returns an empty string for the root path.
///
/// # Example
///
/// ```
/// use json_tree_pointer::{format_json_pointer, PathStep};
///
/// assert_eq!(format_json_pointer(&[]), "");
/// let path = vec![PathStep::from("arr"), PathStep::from(2usize)];
/// assert_eq!(format_json_pointer(&path), "/arr/2");
/// ```
pub fn format_json_pointer(path: &[PathStep]) -> String {
    if path.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for step in path {
        out.push('/');
        out.push_str(&escape_component(&step.as_key()));
    }
    out
}

/// Check if a path points to the root value.
pub fn is_root(path: &[PathStep]) -> bool {
    path.is_empty()
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns an error if the path is the root and has no parent.
pub fn parent(path: &[PathStep]) -> Result<Path, JsonPointerError> {
    if path.is_empty() {
        return Err(JsonPointerError::NoParent);
    }
    Ok(path[..path.len() - 1].to_vec())
}

/// The parent path, or the empty root path when already at the root.
///
/// Counterpart of `initial()` over paths: drops the last step.
pub fn initial(path: &[PathStep]) -> Path {
    if path.is_empty() {
        return Vec::new();
    }
    path[..path.len() - 1].to_vec()
}

/// Check if `path` starts with all the steps of `prefix`.
///
/// A path starts with itself, so this also holds for equal paths.
///
/// # Example
///
/// ```
/// use json_tree_pointer::{starts_with, PathStep};
///
/// let parent = vec![PathStep::from("foo")];
/// let child = vec![PathStep::from("foo"), PathStep::from("bar")];
/// assert!(starts_with(&child, &parent));
/// assert!(starts_with(&parent, &parent));
/// assert!(!starts_with(&parent, &child));
/// ```
pub fn starts_with(path: &[PathStep], prefix: &[PathStep]) -> bool {
    if path.len() < prefix.len() {
        return false;
    }
    path[..prefix.len()] == prefix[..]
}

/// Check if `parent` path strictly contains the `child` path.
pub fn is_child(parent: &[PathStep], child: &[PathStep]) -> bool {
    parent.len() < child.len() && starts_with(child, parent)
}

/// Compute the longest shared prefix of two paths.
///
/// # Example
///
/// ```
/// use json_tree_pointer::{shared_path, PathStep};
///
/// let a = vec![PathStep::from("arr"), PathStep::from(1usize), PathStep::from("name")];
/// let b = vec![PathStep::from("arr"), PathStep::from(1usize), PathStep::from("address")];
/// assert_eq!(shared_path(&a, &b), vec![PathStep::from("arr"), PathStep::from(1usize)]);
/// ```
pub fn shared_path(path1: &[PathStep], path2: &[PathStep]) -> Path {
    let mut i = 0;
    while i < path1.len() && i < path2.len() && path1[i] == path2[i] {
        i += 1;
    }
    path1[..i].to_vec()
}

/// Check if a string represents a valid non-negative integer array index.
///
/// # Example
///
/// ```
/// use json_tree_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("abc"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // No leading zero unless the index is exactly "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("NO_PARENT")]
    NoParent,
    #[error("INVALID_INDEX")]
    InvalidIndex,
}
