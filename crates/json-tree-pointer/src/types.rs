//! Type definitions for JSON Pointer paths.

use std::borrow::Cow;
use std::fmt;

/// A single step in a path: an object key or an array index.
///
/// Paths are value-compared, never reference-compared, so `PathStep`
/// derives `PartialEq`/`Eq`/`Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// An object property key.
    Key(String),
    /// An array element index.
    Index(usize),
}

/// A path locating a node from the document root.
pub type Path = Vec<PathStep>;

impl PathStep {
    /// The step as an object key. Indices render as their decimal form.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathStep::Key(key) => Cow::Borrowed(key),
            PathStep::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    /// The step as an array index, if it can be one.
    ///
    /// A `Key` step made of digits (no leading zero) converts, so paths
    /// parsed from pointer strings can still address arrays.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(index) => Some(*index),
            PathStep::Key(key) => {
                if crate::is_valid_index(key) {
                    key.parse().ok()
                } else {
                    None
                }
            }
        }
    }

    /// True for the `-` token: "one past the last array element".
    pub fn is_append(&self) -> bool {
        matches!(self, PathStep::Key(key) if key == "-")
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => write!(f, "{key}"),
            PathStep::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_string())
    }
}

impl From<String> for PathStep {
    fn from(key: String) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}
