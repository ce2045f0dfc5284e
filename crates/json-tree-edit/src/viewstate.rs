//! View state: the shadow metadata the renderer keeps next to a document.
//!
//! Modeled as a flat map from canonical pointer string to per-node metadata
//! instead of a literal parallel tree, so the document and the view state
//! never need to share a representation. The core only reads and writes the
//! contract below; how a host renders it is its own business.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use json_tree_pointer::{format_json_pointer, PathStep};

use crate::value::Json;

/// Per-node view metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeState {
    /// Whether the node's children are currently visible.
    pub expanded: bool,
    /// Authoritative key order for an object, e.g. after interactive
    /// reorder. `None` falls back to the document's natural key order.
    pub keys: Option<Vec<String>>,
}

/// Shadow tree describing key ordering and expansion per document node.
///
/// Nodes without an entry use the default policy: the root is expanded,
/// everything else is collapsed.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    nodes: HashMap<String, NodeState>,
}

impl ViewState {
    pub fn new() -> ViewState {
        ViewState::default()
    }

    fn node(&self, path: &[PathStep]) -> Option<&NodeState> {
        self.nodes.get(&format_json_pointer(path))
    }

    fn node_mut(&mut self, path: &[PathStep]) -> &mut NodeState {
        let default_expanded = path.is_empty();
        self.nodes
            .entry(format_json_pointer(path))
            .or_insert_with(|| NodeState {
                expanded: default_expanded,
                keys: None,
            })
    }

    /// Whether the node at `path` is expanded.
    pub fn is_expanded(&self, path: &[PathStep]) -> bool {
        match self.node(path) {
            Some(node) => node.expanded,
            None => path.is_empty(),
        }
    }

    pub fn set_expanded(&mut self, path: &[PathStep], expanded: bool) {
        self.node_mut(path).expanded = expanded;
    }

    /// Explicit key order for the object at `path`, if one was recorded.
    pub fn keys(&self, path: &[PathStep]) -> Option<&[String]> {
        self.node(path).and_then(|node| node.keys.as_deref())
    }

    /// Record an explicit key order for the object at `path`.
    pub fn set_keys(&mut self, path: &[PathStep], keys: Vec<String>) {
        self.node_mut(path).keys = Some(keys);
    }

    /// The effective key order of an object node: the recorded order when
    /// present (keys that no longer exist in the document are skipped),
    /// otherwise the document's natural order.
    pub fn object_keys(&self, path: &[PathStep], map: &IndexMap<String, Rc<Json>>) -> Vec<String> {
        match self.keys(path) {
            Some(keys) => keys
                .iter()
                .filter(|key| map.contains_key(key.as_str()))
                .cloned()
                .collect(),
            None => map.keys().cloned().collect(),
        }
    }

    /// A copy of this view state with one node collapsed.
    ///
    /// Multi-select navigation steps over an expanded container by
    /// navigating against this copy instead of mutating the caller's state.
    pub fn with_collapsed(&self, path: &[PathStep]) -> ViewState {
        let mut copy = self.clone();
        copy.set_expanded(path, false);
        copy
    }

    /// Build a view state with every container in `doc` expanded.
    pub fn expand_all(doc: &Json) -> ViewState {
        let mut state = ViewState::new();
        fn recurse(node: &Json, path: &mut Vec<PathStep>, state: &mut ViewState) {
            match node {
                Json::Array(items) => {
                    state.set_expanded(path, true);
                    for (index, item) in items.iter().enumerate() {
                        path.push(PathStep::Index(index));
                        recurse(item, path, state);
                        path.pop();
                    }
                }
                Json::Object(map) => {
                    state.set_expanded(path, true);
                    for (key, value) in map {
                        path.push(PathStep::Key(key.clone()));
                        recurse(value, path, state);
                        path.pop();
                    }
                }
                _ => {}
            }
        }
        recurse(doc, &mut Vec::new(), &mut state);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Json {
        Json::from(value)
    }

    fn path(steps: &[&str]) -> Vec<PathStep> {
        steps.iter().map(|s| PathStep::from(*s)).collect()
    }

    #[test]
    fn default_policy_expands_only_the_root() {
        let state = ViewState::new();
        assert!(state.is_expanded(&[]));
        assert!(!state.is_expanded(&path(&["a"])));
    }

    #[test]
    fn set_keys_keeps_default_expansion() {
        let mut state = ViewState::new();
        state.set_keys(&[], vec!["b".into(), "a".into()]);
        assert!(state.is_expanded(&[]));
    }

    #[test]
    fn object_keys_prefers_recorded_order() {
        let json = doc(json!({"a": 1, "b": 2}));
        let map = json.as_object().unwrap();
        let mut state = ViewState::new();
        assert_eq!(state.object_keys(&[], map), vec!["a", "b"]);

        state.set_keys(&[], vec!["b".into(), "gone".into(), "a".into()]);
        assert_eq!(state.object_keys(&[], map), vec!["b", "a"]);
    }

    #[test]
    fn with_collapsed_does_not_touch_the_original() {
        let mut state = ViewState::new();
        state.set_expanded(&path(&["a"]), true);
        let collapsed = state.with_collapsed(&path(&["a"]));
        assert!(!collapsed.is_expanded(&path(&["a"])));
        assert!(state.is_expanded(&path(&["a"])));
    }

    #[test]
    fn expand_all_covers_nested_containers() {
        let json = doc(json!({"a": {"b": [1, {"c": 2}]}}));
        let state = ViewState::expand_all(&json);
        assert!(state.is_expanded(&[]));
        assert!(state.is_expanded(&path(&["a"])));
        assert!(state.is_expanded(&path(&["a", "b"])));
        assert!(state.is_expanded(&[
            PathStep::from("a"),
            PathStep::from("b"),
            PathStep::Index(1)
        ]));
    }
}
