//! Selection algebra: expansion, directional navigation, serialization.
//!
//! A selection targets a key, a value, an insertion point (`After`/`Inside`),
//! or a contiguous run of siblings (`Multi`). Every consumer matches the
//! variants exhaustively; there is no loosely-shaped record with optional
//! fields.

use std::collections::HashSet;

use thiserror::Error;

use json_tree_pointer::{format_json_pointer, initial, shared_path, starts_with, Path, PathStep};

use crate::docstate::{
    next_visible_path, previous_visible_path, visible_caret_positions, visible_paths, CaretKind,
    CaretPosition,
};
use crate::immutable::get_in;
use crate::value::{canonicalize_path, Json};
use crate::viewstate::ViewState;
use crate::patch::PatchOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// A single object key is targeted.
    Key { anchor: Path, focus: Path, edit: bool },
    /// A single value is targeted.
    Value { anchor: Path, focus: Path, edit: bool },
    /// Insertion cursor immediately after a node.
    After { path: Path },
    /// Insertion cursor inside an (empty) object or array.
    Inside { path: Path },
    /// A contiguous run of sibling paths.
    ///
    /// Invariant: all `paths` share the same parent and are contiguous in
    /// that parent's current key/index order; `anchor` and `focus` are
    /// members of `paths` (or the shared parent when the selection
    /// degenerates to "select the whole parent").
    Multi {
        anchor: Path,
        focus: Path,
        paths: Vec<Path>,
        /// Fast membership index keyed by canonical pointer string.
        path_set: HashSet<String>,
    },
}

/// The request schema accepted by [`create_selection`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionRequest {
    Key { path: Path, edit: bool, next: bool },
    Value { path: Path, edit: bool, next: bool },
    After { path: Path },
    Inside { path: Path },
    Multi { anchor: Path, focus: Path },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The two paths have no valid shared-parent relation; usually a stale
    /// path held against a mutated document.
    #[error("cannot expand selection between {0:?} and {1:?}")]
    CannotExpand(String, String),
}

impl Selection {
    pub fn anchor_path(&self) -> &Path {
        match self {
            Selection::Key { anchor, .. }
            | Selection::Value { anchor, .. }
            | Selection::Multi { anchor, .. } => anchor,
            Selection::After { path } | Selection::Inside { path } => path,
        }
    }

    pub fn focus_path(&self) -> &Path {
        match self {
            Selection::Key { focus, .. }
            | Selection::Value { focus, .. }
            | Selection::Multi { focus, .. } => focus,
            Selection::After { path } | Selection::Inside { path } => path,
        }
    }

    /// The path under which an insertion at this selection would land.
    pub fn parent_path(&self) -> Path {
        match self {
            Selection::Inside { path } => path.clone(),
            other => initial(other.focus_path()),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            Selection::Key { edit: true, .. } | Selection::Value { edit: true, .. }
        )
    }

    /// The same selection with edit mode switched off.
    pub fn remove_edit_mode(self) -> Selection {
        match self {
            Selection::Key { anchor, focus, .. } => Selection::Key {
                anchor,
                focus,
                edit: false,
            },
            Selection::Value { anchor, focus, .. } => Selection::Value {
                anchor,
                focus,
                edit: false,
            },
            other => other,
        }
    }

    /// True when the focus lies strictly inside `path` (or the selection is
    /// an `Inside` cursor on `path` itself).
    pub fn is_inside_path(&self, path: &[PathStep]) -> bool {
        starts_with(self.focus_path(), path)
            && (self.focus_path().len() > path.len() || matches!(self, Selection::Inside { .. }))
    }
}

/// The common root of a selection: the parent of a genuine multi run,
/// otherwise the focus path itself.
pub fn root_path(selection: &Selection) -> Path {
    match selection {
        Selection::Multi { focus, paths, .. } if paths.len() > 1 => initial(focus),
        other => other.focus_path().clone(),
    }
}

/// A selection covering the whole document.
pub fn select_all() -> Selection {
    Selection::Value {
        anchor: Vec::new(),
        focus: Vec::new(),
        edit: false,
    }
}

fn single_path_selection(path: Path, edit: bool, key: bool) -> Selection {
    if key {
        Selection::Key {
            anchor: path.clone(),
            focus: path,
            edit,
        }
    } else {
        Selection::Value {
            anchor: path.clone(),
            focus: path,
            edit,
        }
    }
}

fn multi_selection(anchor: Path, focus: Path, paths: Vec<Path>) -> Selection {
    let path_set = paths.iter().map(|p| format_json_pointer(p)).collect();
    Selection::Multi {
        anchor,
        focus,
        paths,
        path_set,
    }
}

/// Expand anchor and focus into the ordered run of all paths between and
/// including them.
///
/// Equal paths select just that node. When one path is a strict prefix of
/// the other, the run collapses to the shared prefix (the common parent).
/// Otherwise both paths diverge under one parent node, and the run spans
/// every sibling between the two positions inclusive, regardless of which
/// endpoint comes first in the parent's order.
pub fn expand_selection(
    doc: &Json,
    state: &ViewState,
    anchor_path: &[PathStep],
    focus_path: &[PathStep],
) -> Result<Vec<Path>, SelectionError> {
    if anchor_path == focus_path {
        // just a single node
        return Ok(vec![anchor_path.to_vec()]);
    }

    let shared = shared_path(anchor_path, focus_path);
    if anchor_path.len() == shared.len() || focus_path.len() == shared.len() {
        // a parent and a child: select the parent
        return Ok(vec![shared]);
    }

    let anchor_step = &anchor_path[shared.len()];
    let focus_step = &focus_path[shared.len()];

    match get_in(doc, &shared) {
        Some(Json::Object(map)) => {
            let keys = state.object_keys(&shared, map);
            let anchor_index = keys.iter().position(|k| *k == anchor_step.as_key());
            let focus_index = keys.iter().position(|k| *k == focus_step.as_key());
            if let (Some(anchor_index), Some(focus_index)) = (anchor_index, focus_index) {
                let start = anchor_index.min(focus_index);
                let end = anchor_index.max(focus_index);
                let paths = (start..=end)
                    .map(|i| {
                        let mut path = shared.clone();
                        path.push(PathStep::Key(keys[i].clone()));
                        path
                    })
                    .collect();
                return Ok(paths);
            }
            Err(cannot_expand(anchor_path, focus_path))
        }
        Some(Json::Array(_)) => {
            let anchor_index = anchor_step.as_index();
            let focus_index = focus_step.as_index();
            if let (Some(anchor_index), Some(focus_index)) = (anchor_index, focus_index) {
                let start = anchor_index.min(focus_index);
                let end = anchor_index.max(focus_index);
                let paths = (start..=end)
                    .map(|i| {
                        let mut path = shared.clone();
                        path.push(PathStep::Index(i));
                        path
                    })
                    .collect();
                return Ok(paths);
            }
            Err(cannot_expand(anchor_path, focus_path))
        }
        _ => Err(cannot_expand(anchor_path, focus_path)),
    }
}

fn cannot_expand(anchor: &[PathStep], focus: &[PathStep]) -> SelectionError {
    SelectionError::CannotExpand(format_json_pointer(anchor), format_json_pointer(focus))
}

/// Construct a selection from a request.
///
/// `next = true` on a `Key` request promotes it to a `Value` selection; on a
/// `Value` request it additionally advances to the next visible node (and
/// stays put when there is none).
pub fn create_selection(
    doc: &Json,
    state: &ViewState,
    request: SelectionRequest,
) -> Result<Selection, SelectionError> {
    match request {
        SelectionRequest::Key { path, edit, next } => {
            Ok(single_path_selection(path, edit, !next))
        }
        SelectionRequest::Value { path, edit, next } => {
            let selection = single_path_selection(path, edit, false);
            if next {
                Ok(selection_down(doc, state, &selection, false).unwrap_or(selection))
            } else {
                Ok(selection)
            }
        }
        SelectionRequest::After { path } => Ok(Selection::After { path }),
        SelectionRequest::Inside { path } => Ok(Selection::Inside { path }),
        SelectionRequest::Multi { anchor, focus } => {
            let paths = expand_selection(doc, state, &anchor, &focus)?;
            // the requested anchor or focus may lie somewhere inside the
            // returned run when expansion enlarged the selection to a whole
            // parent; keep the reported focus on the endpoint nearest the
            // requested focus
            let first = paths.first().cloned().unwrap_or_default();
            let last = paths.last().cloned().unwrap_or_default();
            let focus_last = focus == last || anchor == first;
            if focus_last {
                Ok(multi_selection(first, last, paths))
            } else {
                Ok(multi_selection(last, first, paths))
            }
        }
    }
}

/// A proper initial selection for a freshly opened document: the first,
/// deepest visible entry. Array items and the root have no key, so those
/// select the value.
pub fn initial_selection(doc: &Json, state: &ViewState) -> Selection {
    let paths = visible_paths(doc, state);
    let mut index = 0;
    while index + 1 < paths.len() && paths[index + 1].len() > paths[index].len() {
        index += 1;
    }
    let path = paths[index].clone();
    let parent_is_array = matches!(get_in(doc, &initial(&path)), Some(Json::Array(_)));
    single_path_selection(path.clone(), false, !(path.is_empty() || parent_is_array))
}

/// Move the selection to the previous visible path.
///
/// Returns `None` when already at the first visible node. With
/// `keep_anchor` the selection grows into a `Multi` from the existing
/// anchor instead of moving wholesale.
pub fn selection_up(
    doc: &Json,
    state: &ViewState,
    selection: &Selection,
    keep_anchor: bool,
) -> Option<Selection> {
    let previous = previous_visible_path(doc, state, selection.focus_path())?;

    if keep_anchor {
        let anchor = selection.anchor_path().clone();
        let focus = match selection {
            Selection::After { .. } | Selection::Inside { .. } => anchor.clone(),
            _ => previous,
        };
        return create_selection(doc, state, SelectionRequest::Multi { anchor, focus }).ok();
    }

    match selection {
        Selection::Key { .. } => {
            let parent_is_array =
                matches!(get_in(doc, &initial(&previous)), Some(Json::Array(_)));
            // arrays have no keys, and neither does the root
            let key = !(previous.is_empty() || parent_is_array);
            Some(single_path_selection(previous, false, key))
        }
        Selection::Value { .. } => Some(single_path_selection(previous, false, false)),
        _ => create_selection(
            doc,
            state,
            SelectionRequest::Multi {
                anchor: previous.clone(),
                focus: previous,
            },
        )
        .ok(),
    }
}

/// Move the selection to the next visible path.
///
/// With `keep_anchor`, stepping over an expanded container treats it as
/// collapsed, so a growing multi selection never descends into a
/// container's children.
pub fn selection_down(
    doc: &Json,
    state: &ViewState,
    selection: &Selection,
    keep_anchor: bool,
) -> Option<Selection> {
    let focus = selection.focus_path();
    let next = next_visible_path(doc, state, focus)?;

    if keep_anchor {
        let focus_is_container = matches!(get_in(doc, focus), Some(node) if node.is_container());
        let next_after = if focus_is_container {
            let collapsed = state.with_collapsed(focus);
            next_visible_path(doc, &collapsed, focus)?
        } else {
            next.clone()
        };

        let (anchor, focus) = match selection {
            Selection::After { .. } => (next_after.clone(), next_after),
            Selection::Inside { .. } => (next.clone(), next),
            _ => (selection.anchor_path().clone(), next_after),
        };
        return create_selection(doc, state, SelectionRequest::Multi { anchor, focus }).ok();
    }

    match selection {
        Selection::Key { .. } => {
            let parent_is_array = matches!(get_in(doc, &initial(&next)), Some(Json::Array(_)));
            Some(single_path_selection(next, false, !parent_is_array))
        }
        Selection::Value { .. } => Some(single_path_selection(next, false, false)),
        _ => create_selection(
            doc,
            state,
            SelectionRequest::Multi {
                anchor: next.clone(),
                focus: next,
            },
        )
        .ok(),
    }
}

fn caret_kind(selection: &Selection) -> Option<CaretKind> {
    match selection {
        Selection::Key { .. } => Some(CaretKind::Key),
        Selection::Value { .. } => Some(CaretKind::Value),
        Selection::After { .. } => Some(CaretKind::After),
        Selection::Inside { .. } => Some(CaretKind::Inside),
        Selection::Multi { .. } => None,
    }
}

struct CaretNeighborhood {
    caret: Option<CaretPosition>,
    previous: Option<CaretPosition>,
    next: Option<CaretPosition>,
}

fn find_caret_and_siblings(
    doc: &Json,
    state: &ViewState,
    selection: &Selection,
) -> CaretNeighborhood {
    let kind = caret_kind(selection);
    let carets = visible_caret_positions(doc, state);
    let index = kind.and_then(|kind| {
        carets
            .iter()
            .position(|caret| caret.kind == kind && &caret.path == selection.focus_path())
    });
    match index {
        Some(index) => CaretNeighborhood {
            caret: Some(carets[index].clone()),
            previous: index.checked_sub(1).map(|i| carets[i].clone()),
            next: carets.get(index + 1).cloned(),
        },
        None => CaretNeighborhood {
            caret: None,
            previous: None,
            next: None,
        },
    }
}

fn request_from_caret(caret: CaretPosition) -> SelectionRequest {
    match caret.kind {
        CaretKind::Key => SelectionRequest::Key {
            path: caret.path,
            edit: false,
            next: false,
        },
        CaretKind::Value => SelectionRequest::Value {
            path: caret.path,
            edit: false,
            next: false,
        },
        CaretKind::After => SelectionRequest::After { path: caret.path },
        CaretKind::Inside => SelectionRequest::Inside { path: caret.path },
    }
}

/// Step left along the visible caret positions.
pub fn selection_left(
    doc: &Json,
    state: &ViewState,
    selection: &Selection,
    keep_anchor: bool,
) -> Option<Selection> {
    let neighborhood = find_caret_and_siblings(doc, state, selection);

    if keep_anchor {
        if !matches!(selection, Selection::Multi { .. }) {
            return create_selection(
                doc,
                state,
                SelectionRequest::Multi {
                    anchor: selection.anchor_path().clone(),
                    focus: selection.focus_path().clone(),
                },
            )
            .ok();
        }
        return None;
    }

    if neighborhood.caret.is_some() {
        if let Some(previous) = neighborhood.previous {
            return create_selection(doc, state, request_from_caret(previous)).ok();
        }
    }

    let parent_is_array = matches!(
        get_in(doc, &initial(selection.focus_path())),
        Some(Json::Array(_))
    );

    match selection {
        Selection::Value { focus, .. } if parent_is_array => create_selection(
            doc,
            state,
            SelectionRequest::Multi {
                anchor: focus.clone(),
                focus: focus.clone(),
            },
        )
        .ok(),
        Selection::Multi { focus, .. } if !parent_is_array => create_selection(
            doc,
            state,
            SelectionRequest::Key {
                path: focus.clone(),
                edit: false,
                next: false,
            },
        )
        .ok(),
        _ => None,
    }
}

/// Step right along the visible caret positions.
pub fn selection_right(
    doc: &Json,
    state: &ViewState,
    selection: &Selection,
    keep_anchor: bool,
) -> Option<Selection> {
    let neighborhood = find_caret_and_siblings(doc, state, selection);

    if keep_anchor {
        if !matches!(selection, Selection::Multi { .. }) {
            return create_selection(
                doc,
                state,
                SelectionRequest::Multi {
                    anchor: selection.anchor_path().clone(),
                    focus: selection.focus_path().clone(),
                },
            )
            .ok();
        }
        return None;
    }

    if neighborhood.caret.is_some() {
        if let Some(next) = neighborhood.next {
            return create_selection(doc, state, request_from_caret(next)).ok();
        }
    }

    match selection {
        Selection::Multi { focus, .. } => create_selection(
            doc,
            state,
            SelectionRequest::Value {
                path: focus.clone(),
                edit: false,
                next: false,
            },
        )
        .ok(),
        _ => None,
    }
}

/// Derive a `Multi` selection from the `add`/`copy`/`replace` operations of
/// a patch, treating their paths as a contiguous run in the order given.
///
/// Best-effort reconstruction: when the paths are not contiguous siblings
/// in the document's current order, the run deterministically collapses to
/// just the first path. Returns `None` when the patch holds no eligible
/// operations.
pub fn selection_from_ops(doc: &Json, ops: &[PatchOp]) -> Option<Selection> {
    let paths: Vec<Path> = ops
        .iter()
        .filter_map(|op| match op {
            PatchOp::Add { path, .. }
            | PatchOp::Copy { path, .. }
            | PatchOp::Replace { path, .. } => Some(canonicalize_path(doc, path)),
            _ => None,
        })
        .collect();

    let first = paths.first()?.clone();
    let paths = if contiguous_siblings(doc, &paths) {
        paths
    } else {
        vec![first.clone()]
    };
    let last = paths.last().cloned().unwrap_or_else(|| first.clone());
    Some(multi_selection(first, last, paths))
}

fn contiguous_siblings(doc: &Json, paths: &[Path]) -> bool {
    let Some(first) = paths.first() else {
        return false;
    };
    if first.is_empty() {
        return paths.len() == 1;
    }
    let parent_path = initial(first);
    let Some(parent) = get_in(doc, &parent_path) else {
        return false;
    };
    let positions: Option<Vec<usize>> = paths
        .iter()
        .map(|path| {
            if initial(path) != parent_path {
                return None;
            }
            let step = path.last()?;
            match parent {
                Json::Object(map) => map.get_index_of(step.as_key().as_ref()),
                Json::Array(_) => step.as_index(),
                _ => None,
            }
        })
        .collect();
    match positions {
        Some(positions) => positions.windows(2).all(|w| w[1] == w[0] + 1),
        None => false,
    }
}

/// Serialize the selected contents into plain text partial JSON, e.g. for
/// the clipboard.
///
/// Returns `None` for insertion cursors, which have no textual content.
pub fn selection_to_text(doc: &Json, selection: &Selection, indent: usize) -> Option<String> {
    match selection {
        Selection::Key { focus, .. } => {
            let key = focus.last()?;
            Some(Json::String(key.as_key().into_owned()).stringify(0))
        }
        Selection::Value { focus, .. } => {
            let value = get_in(doc, focus)?;
            Some(value.stringify(indent))
        }
        Selection::Multi { paths, .. } => {
            let parent_path = selection.parent_path();
            let parent = get_in(doc, &parent_path)?;
            if parent.is_array() {
                if paths.len() == 1 {
                    // do not suffix a single selected array item with a comma
                    let item = get_in(doc, &paths[0])?;
                    return Some(item.stringify(indent));
                }
                let lines: Vec<String> = paths
                    .iter()
                    .filter_map(|path| get_in(doc, path))
                    .map(|item| format!("{},", item.stringify(indent)))
                    .collect();
                Some(lines.join("\n"))
            } else {
                let lines: Vec<String> = paths
                    .iter()
                    .filter_map(|path| {
                        let key = path.last()?;
                        let value = get_in(doc, path)?;
                        Some(format!(
                            "{}: {},",
                            Json::String(key.as_key().into_owned()).stringify(0),
                            value.stringify(indent)
                        ))
                    })
                    .collect();
                Some(lines.join("\n"))
            }
        }
        Selection::After { .. } | Selection::Inside { .. } => None,
    }
}
