//! Core types for the patch engine.

use thiserror::Error;

use json_tree_pointer::Path;

use crate::immutable::PathError;
use crate::value::Json;

/// A single patch operation, request-scoped: constructed by a caller,
/// consumed once by the engine, never retained.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Add { path: Path, value: Json },
    Remove { path: Path },
    Replace { path: Path, value: Json },
    Copy { path: Path, from: Path },
    Move { path: Path, from: Path },
    Test { path: Path, value: Json },
}

impl PatchOp {
    /// The operation name as it appears on the wire.
    pub fn op_name(&self) -> &'static str {
        match self {
            PatchOp::Add { .. } => "add",
            PatchOp::Remove { .. } => "remove",
            PatchOp::Replace { .. } => "replace",
            PatchOp::Copy { .. } => "copy",
            PatchOp::Move { .. } => "move",
            PatchOp::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PatchOp::Add { path, .. }
            | PatchOp::Remove { path }
            | PatchOp::Replace { path, .. }
            | PatchOp::Copy { path, .. }
            | PatchOp::Move { path, .. }
            | PatchOp::Test { path, .. } => path,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("unknown JSON Patch op {0:?}")]
    UnknownOp(String),
    #[error("malformed operation: {0}")]
    Malformed(String),
    #[error("test failed, value differs at {0:?}")]
    TestFailed(String),
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Outcome of applying a whole patch.
///
/// On error, `doc` is the original input document and `revert` is empty:
/// no partial application is ever visible to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchResult {
    pub doc: Json,
    pub revert: Vec<PatchOp>,
    pub error: Option<PatchError>,
}
