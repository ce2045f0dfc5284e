//! json-tree-edit — structural editing core for JSON documents.
//!
//! Three components sharing one immutable data model:
//!
//! - a patch engine ([`patch`]) that applies RFC 6902 operations and
//!   produces the exact inverse patch alongside the new document;
//! - a selection algebra ([`selection`], [`docstate`]) that navigates a
//!   partially collapsed tree by logical direction and expands multi-node
//!   selections;
//! - an incremental, cancellable search engine ([`search`]).
//!
//! Documents are [`value::Json`] trees with `Rc`-shared children: every
//! edit returns a new root that shares all untouched subtrees with the
//! input, so callers can keep old revisions for undo or time travel at no
//! cost. The view state ([`viewstate::ViewState`]) carries key ordering
//! and expansion flags next to the document without touching it.

pub mod value;
pub mod immutable;
pub mod viewstate;
pub mod docstate;
pub mod patch;
pub mod selection;
pub mod search;

pub use value::{canonicalize_path, parse_path_with_indices, Json};
pub use viewstate::{NodeState, ViewState};
pub use patch::{apply_json, apply_patch, PatchError, PatchOp, PatchResult};
pub use selection::{
    create_selection, expand_selection, initial_selection, selection_down, selection_from_ops,
    selection_left, selection_right, selection_to_text, selection_up, Selection, SelectionError,
    SelectionRequest,
};
pub use search::{search, SearchMatch, SearchOptions, SearchResult, SearchStatus, SearchTask};
