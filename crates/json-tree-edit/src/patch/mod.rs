//! JSON Patch (RFC 6902) engine with inverse-patch generation.
//!
//! Applies a sequence of operations to an immutable document and produces,
//! alongside the updated document, the exact revert patch that undoes the
//! whole sequence. A failing `test` or any malformed operation rejects the
//! entire patch: the caller gets the original document back, never a
//! partially applied one.

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply_json, apply_patch, resolve_path_index};
pub use codec::{decode_op, decode_patch, encode_op, encode_patch};
pub use types::{PatchError, PatchOp, PatchResult};
