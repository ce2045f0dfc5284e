//! Flattening of the visible (expansion-aware) tree.
//!
//! Directional navigation treats the document as a flat sequence of visible
//! paths and, one level finer, of caret positions. Both sequences are
//! derived on demand from `(document, view state)` and never stored.

use json_tree_pointer::{Path, PathStep};

use crate::value::Json;
use crate::viewstate::ViewState;

/// The discrete focus points navigable by left/right movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretKind {
    After,
    Key,
    Value,
    Inside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretPosition {
    pub path: Path,
    pub kind: CaretKind,
}

fn append_step(path: &[PathStep], step: PathStep) -> Path {
    let mut child = path.to_vec();
    child.push(step);
    child
}

/// All currently visible paths, in rendering order.
///
/// The root is always visible. Children of a node are visible only when the
/// node is expanded; arrays list children in index order, objects in the
/// view-state key order.
pub fn visible_paths(doc: &Json, state: &ViewState) -> Vec<Path> {
    let mut paths = vec![Vec::new()];
    collect_visible(doc, state, &Vec::new(), &mut paths);
    paths
}

fn collect_visible(node: &Json, state: &ViewState, path: &[PathStep], out: &mut Vec<Path>) {
    if !state.is_expanded(path) {
        return;
    }
    match node {
        Json::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let child_path = append_step(path, PathStep::Index(index));
                out.push(child_path.clone());
                collect_visible(item, state, &child_path, out);
            }
        }
        Json::Object(map) => {
            for key in state.object_keys(path, map) {
                if let Some(child) = map.get(&key) {
                    let child_path = append_step(path, PathStep::Key(key));
                    out.push(child_path.clone());
                    collect_visible(child, state, &child_path, out);
                }
            }
        }
        _ => {}
    }
}

/// The visible path immediately after `path`, or `None` at the end.
pub fn next_visible_path(doc: &Json, state: &ViewState, path: &[PathStep]) -> Option<Path> {
    let paths = visible_paths(doc, state);
    let index = paths.iter().position(|p| p == path)?;
    paths.get(index + 1).cloned()
}

/// The visible path immediately before `path`, or `None` at the start.
pub fn previous_visible_path(doc: &Json, state: &ViewState, path: &[PathStep]) -> Option<Path> {
    let paths = visible_paths(doc, state);
    let index = paths.iter().position(|p| p == path)?;
    if index == 0 {
        return None;
    }
    paths.get(index - 1).cloned()
}

/// All currently visible caret positions, in rendering order.
///
/// Every visible node contributes a `Value` caret. An expanded container
/// additionally contributes an `Inside` caret, and each of its children a
/// `Key` caret (objects only, before the child's own positions) and an
/// `After` caret (after them).
pub fn visible_caret_positions(doc: &Json, state: &ViewState) -> Vec<CaretPosition> {
    let mut carets = Vec::new();
    collect_carets(doc, state, &Vec::new(), &mut carets);
    carets
}

fn collect_carets(node: &Json, state: &ViewState, path: &[PathStep], out: &mut Vec<CaretPosition>) {
    out.push(CaretPosition {
        path: path.to_vec(),
        kind: CaretKind::Value,
    });
    if !node.is_container() || !state.is_expanded(path) {
        return;
    }
    out.push(CaretPosition {
        path: path.to_vec(),
        kind: CaretKind::Inside,
    });
    match node {
        Json::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let child_path = append_step(path, PathStep::Index(index));
                collect_carets(item, state, &child_path, out);
                out.push(CaretPosition {
                    path: child_path,
                    kind: CaretKind::After,
                });
            }
        }
        Json::Object(map) => {
            for key in state.object_keys(path, map) {
                if let Some(child) = map.get(&key) {
                    let child_path = append_step(path, PathStep::Key(key));
                    out.push(CaretPosition {
                        path: child_path.clone(),
                        kind: CaretKind::Key,
                    });
                    collect_carets(child, state, &child_path, out);
                    out.push(CaretPosition {
                        path: child_path,
                        kind: CaretKind::After,
                    });
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Json {
        Json::from(value)
    }

    fn path(steps: &[&str]) -> Path {
        steps.iter().map(|s| PathStep::from(*s)).collect()
    }

    #[test]
    fn visible_paths_respects_expansion() {
        let json = doc(json!({"a": {"b": 1}, "c": 2}));

        // default policy: only the root is expanded
        let state = ViewState::new();
        assert_eq!(
            visible_paths(&json, &state),
            vec![path(&[]), path(&["a"]), path(&["c"])]
        );

        let expanded = ViewState::expand_all(&json);
        assert_eq!(
            visible_paths(&json, &expanded),
            vec![path(&[]), path(&["a"]), path(&["a", "b"]), path(&["c"])]
        );
    }

    #[test]
    fn visible_paths_uses_view_state_key_order() {
        let json = doc(json!({"a": 1, "b": 2}));
        let mut state = ViewState::new();
        state.set_keys(&[], vec!["b".into(), "a".into()]);
        assert_eq!(
            visible_paths(&json, &state),
            vec![path(&[]), path(&["b"]), path(&["a"])]
        );
    }

    #[test]
    fn next_and_previous_visible_path() {
        let json = doc(json!({"a": 1, "b": 2}));
        let state = ViewState::new();
        assert_eq!(
            next_visible_path(&json, &state, &path(&["a"])),
            Some(path(&["b"]))
        );
        assert_eq!(next_visible_path(&json, &state, &path(&["b"])), None);
        assert_eq!(
            previous_visible_path(&json, &state, &path(&["a"])),
            Some(path(&[]))
        );
        assert_eq!(previous_visible_path(&json, &state, &path(&[])), None);
    }

    #[test]
    fn caret_positions_for_a_flat_object() {
        let json = doc(json!({"a": 1}));
        let state = ViewState::new();
        let carets = visible_caret_positions(&json, &state);
        assert_eq!(
            carets,
            vec![
                CaretPosition { path: path(&[]), kind: CaretKind::Value },
                CaretPosition { path: path(&[]), kind: CaretKind::Inside },
                CaretPosition { path: path(&["a"]), kind: CaretKind::Key },
                CaretPosition { path: path(&["a"]), kind: CaretKind::Value },
                CaretPosition { path: path(&["a"]), kind: CaretKind::After },
            ]
        );
    }

    #[test]
    fn caret_positions_skip_collapsed_containers() {
        let json = doc(json!({"a": {"b": 1}}));
        let state = ViewState::new();
        let carets = visible_caret_positions(&json, &state);
        // "a" is collapsed: it contributes Key/Value/After but nothing inside
        assert!(carets
            .iter()
            .all(|c| !(c.path == path(&["a", "b"]) || (c.path == path(&["a"]) && c.kind == CaretKind::Inside))));
    }

    #[test]
    fn array_items_have_no_key_caret() {
        let json = doc(json!([1]));
        let state = ViewState::new();
        let carets = visible_caret_positions(&json, &state);
        assert!(!carets.iter().any(|c| c.kind == CaretKind::Key));
        // but the item itself is reachable as a Value caret
        assert!(carets
            .iter()
            .any(|c| c.kind == CaretKind::Value && c.path == vec![PathStep::Index(0)]));
    }
}
