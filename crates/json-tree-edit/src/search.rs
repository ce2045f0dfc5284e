//! Incremental, cancellable text search over a document.
//!
//! The traversal runs as an explicitly resumable task: an internal work
//! stack replaces native recursion (depth is bounded by allocation, not the
//! call stack) and [`SearchTask::resume`] hands control back to the host
//! every `yield_every` visited entries. Hosts with their own scheduler call
//! `resume` once per turn; everyone else calls [`SearchTask::run`].

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use json_tree_pointer::{Path, PathStep};

use crate::value::Json;
use crate::viewstate::ViewState;

// ── Matches ──────────────────────────────────────────────────────────────

/// What part of a node matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// An object key contains the search text.
    Key,
    /// A scalar value's string form contains the search text.
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub path: Path,
    pub kind: MatchKind,
}

/// Case-insensitive substring test.
pub fn contains_case_insensitive(text: &str, search_text: &str) -> bool {
    text.to_lowercase().contains(&search_text.to_lowercase())
}

/// The string form a scalar is matched against: unquoted strings, and the
/// JSON notation of null, booleans and numbers.
fn value_text(node: &Json) -> Option<String> {
    match node {
        Json::Null => Some("null".to_string()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Number(n) => Some(n.to_string()),
        Json::String(s) => Some(s.clone()),
        Json::Array(_) | Json::Object(_) => None,
    }
}

// ── The search task ──────────────────────────────────────────────────────

/// Callbacks and tuning knobs for a search run.
pub struct SearchOptions<'a> {
    on_progress: Option<Box<dyn FnMut(&[SearchMatch]) + 'a>>,
    on_done: Option<Box<dyn FnOnce(&[SearchMatch]) + 'a>>,
    max_results: Option<usize>,
    yield_every: usize,
}

impl<'a> SearchOptions<'a> {
    pub fn new() -> SearchOptions<'a> {
        SearchOptions {
            on_progress: None,
            on_done: None,
            max_results: None,
            yield_every: 10_000,
        }
    }

    /// Called at a suspension point when new matches arrived since the last
    /// report.
    pub fn on_progress(mut self, f: impl FnMut(&[SearchMatch]) + 'a) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Called exactly once with the final matches, unless the search is
    /// cancelled first.
    pub fn on_done(mut self, f: impl FnOnce(&[SearchMatch]) + 'a) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    /// Stop searching once this many matches are found.
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Suspend once every this many visited entries (default 10 000).
    pub fn yield_every(mut self, n: usize) -> Self {
        self.yield_every = n.max(1);
        self
    }
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        SearchOptions::new()
    }
}

/// Observed result of one `resume` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Work remains; call `resume` again.
    Suspended,
    /// Traversal finished (or hit `max_results`); `on_done` has fired.
    Done,
    /// A cancel request was observed; `on_done` will never fire.
    Cancelled,
}

/// Cancellation handle, shared with the host.
#[derive(Clone)]
pub struct SearchHandle {
    cancelled: Rc<Cell<bool>>,
}

impl SearchHandle {
    /// Request cancellation. Observed at the next suspension boundary; never
    /// interrupts mid-node work.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }
}

/// One pending unit of traversal work.
enum Task<'a> {
    /// Visit a node: scalars are matched, containers push their children.
    Node { node: &'a Json, path: Path },
    /// Match an object key against the search text. The key is the last
    /// step of `path`.
    KeyCheck { path: Path },
}

/// A resumable depth-first search over `(document, view state)`.
///
/// Arrays are traversed in index order, objects in the view-state key order,
/// pre-order, each object key checked before its value is descended.
pub struct SearchTask<'a> {
    text: String,
    state: &'a ViewState,
    stack: Vec<Task<'a>>,
    matches: Vec<SearchMatch>,
    reported: usize,
    visits: usize,
    options: SearchOptions<'a>,
    cancelled: Rc<Cell<bool>>,
    finished: bool,
}

/// Start a search. The returned task owns the traversal; drive it with
/// [`SearchTask::resume`] or [`SearchTask::run`].
pub fn search<'a>(
    text: &str,
    doc: &'a Json,
    state: &'a ViewState,
    options: SearchOptions<'a>,
) -> SearchTask<'a> {
    let stack = if text.is_empty() {
        // empty search text completes immediately with zero results
        Vec::new()
    } else {
        vec![Task::Node {
            node: doc,
            path: Vec::new(),
        }]
    };
    SearchTask {
        text: text.to_string(),
        state,
        stack,
        matches: Vec::new(),
        reported: 0,
        visits: 0,
        options,
        cancelled: Rc::new(Cell::new(false)),
        finished: false,
    }
}

impl<'a> SearchTask<'a> {
    pub fn handle(&self) -> SearchHandle {
        SearchHandle {
            cancelled: Rc::clone(&self.cancelled),
        }
    }

    /// The matches found so far.
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Perform up to `yield_every` visits, then hand control back.
    pub fn resume(&mut self) -> SearchStatus {
        if self.finished {
            return SearchStatus::Done;
        }
        if self.cancelled.get() {
            return SearchStatus::Cancelled;
        }

        while let Some(task) = self.stack.pop() {
            let visited = match task {
                Task::Node { node, path } => self.visit_node(node, path),
                Task::KeyCheck { path } => {
                    // key checks only get queued by object traversal, so the
                    // last step is always a key
                    if let Some(step) = path.last() {
                        if contains_case_insensitive(&step.as_key(), &self.text) {
                            self.matches.push(SearchMatch {
                                path: path.clone(),
                                kind: MatchKind::Key,
                            });
                        }
                    }
                    true
                }
            };
            if self.reached_max_results() {
                return self.finish();
            }
            if visited {
                self.visits += 1;
                if self.visits % self.options.yield_every == 0 {
                    self.report_progress();
                    return SearchStatus::Suspended;
                }
            }
        }

        self.finish()
    }

    /// Drive `resume` to completion, for hosts without their own scheduler.
    pub fn run(&mut self) -> SearchStatus {
        loop {
            match self.resume() {
                SearchStatus::Suspended => continue,
                status => return status,
            }
        }
    }

    /// Process one node. Returns whether this counted as a visit (object
    /// entries and scalar leaves count; container frames do not).
    fn visit_node(&mut self, node: &'a Json, path: Path) -> bool {
        match node {
            Json::Array(items) => {
                for (index, item) in items.iter().enumerate().rev() {
                    let mut child_path = path.clone();
                    child_path.push(PathStep::Index(index));
                    self.stack.push(Task::Node {
                        node: item,
                        path: child_path,
                    });
                }
                false
            }
            Json::Object(map) => {
                // push in reverse so the first key pops first; each key's
                // check precedes its value's subtree
                for key in self.state.object_keys(&path, map).into_iter().rev() {
                    if let Some(child) = map.get(&key) {
                        let mut child_path = path.clone();
                        child_path.push(PathStep::Key(key));
                        self.stack.push(Task::Node {
                            node: child,
                            path: child_path.clone(),
                        });
                        self.stack.push(Task::KeyCheck { path: child_path });
                    }
                }
                false
            }
            scalar => {
                if let Some(text) = value_text(scalar) {
                    if contains_case_insensitive(&text, &self.text) {
                        self.matches.push(SearchMatch {
                            path,
                            kind: MatchKind::Value,
                        });
                    }
                }
                true
            }
        }
    }

    fn reached_max_results(&self) -> bool {
        match self.options.max_results {
            Some(max) => self.matches.len() >= max,
            None => false,
        }
    }

    fn report_progress(&mut self) {
        if self.matches.len() > self.reported {
            self.reported = self.matches.len();
            if let Some(on_progress) = self.options.on_progress.as_mut() {
                on_progress(&self.matches);
            }
        }
    }

    fn finish(&mut self) -> SearchStatus {
        self.finished = true;
        self.stack.clear();
        if let Some(on_done) = self.options.on_done.take() {
            on_done(&self.matches);
        }
        SearchStatus::Done
    }
}

// ── Result assembly ──────────────────────────────────────────────────────

/// Highlight marker attached to a matched key or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMarker {
    Match,
    Active,
}

/// A document-shaped tree populated only where matches exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedNode {
    /// Marker on this node's key, if its key matched.
    pub key: Option<SearchMarker>,
    /// Marker on this node's value, if its value matched.
    pub value: Option<SearchMarker>,
    /// Children with matches somewhere below them, keyed by step.
    pub children: HashMap<String, MatchedNode>,
}

impl MatchedNode {
    fn descend_mut(&mut self, path: &[PathStep]) -> &mut MatchedNode {
        let mut node = self;
        for step in path {
            node = node
                .children
                .entry(step.as_key().into_owned())
                .or_default();
        }
        node
    }

    /// Look up the node for `path`, if any match was recorded there or below.
    pub fn descend(&self, path: &[PathStep]) -> Option<&MatchedNode> {
        let mut node = self;
        for step in path {
            node = node.children.get(step.as_key().as_ref())?;
        }
        Some(node)
    }
}

/// The assembled outcome of a search, navigable with next/previous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
    pub matched_tree: MatchedNode,
    pub active_index: Option<usize>,
}

impl SearchResult {
    /// Build a result from the flat match list.
    ///
    /// When the previously active match still exists in the new list it
    /// stays active; otherwise the first match becomes active.
    pub fn new(matches: Vec<SearchMatch>, previous: Option<&SearchResult>) -> SearchResult {
        let retained = previous
            .and_then(|p| p.active_match())
            .and_then(|active| matches.iter().position(|m| m == active));
        let active_index = retained.or(if matches.is_empty() { None } else { Some(0) });

        let mut matched_tree = MatchedNode::default();
        for m in &matches {
            set_marker(&mut matched_tree, m, SearchMarker::Match);
        }
        let mut result = SearchResult {
            matches,
            matched_tree,
            active_index,
        };
        if let Some(index) = result.active_index {
            let m = result.matches[index].clone();
            set_marker(&mut result.matched_tree, &m, SearchMarker::Active);
        }
        result
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn active_match(&self) -> Option<&SearchMatch> {
        self.active_index.and_then(|i| self.matches.get(i))
    }

    /// Advance the active match, wrapping past the end back to the first.
    pub fn next(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        let next = match self.active_index {
            Some(i) if i + 1 < self.matches.len() => i + 1,
            _ => 0,
        };
        self.set_active(next);
    }

    /// Step the active match back, wrapping before the start to the last.
    pub fn previous(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        let previous = match self.active_index {
            Some(i) if i > 0 => i - 1,
            _ => self.matches.len() - 1,
        };
        self.set_active(previous);
    }

    fn set_active(&mut self, index: usize) {
        if let Some(old) = self.active_index {
            let m = self.matches[old].clone();
            set_marker(&mut self.matched_tree, &m, SearchMarker::Match);
        }
        let m = self.matches[index].clone();
        set_marker(&mut self.matched_tree, &m, SearchMarker::Active);
        self.active_index = Some(index);
    }
}

fn set_marker(tree: &mut MatchedNode, m: &SearchMatch, marker: SearchMarker) {
    let node = tree.descend_mut(&m.path);
    match m.kind {
        MatchKind::Key => node.key = Some(marker),
        MatchKind::Value => node.value = Some(marker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    fn doc(value: serde_json::Value) -> Json {
        Json::from(value)
    }

    fn key_match(steps: &[&str]) -> SearchMatch {
        SearchMatch {
            path: steps.iter().map(|s| PathStep::from(*s)).collect(),
            kind: MatchKind::Key,
        }
    }

    fn value_match(steps: &[&str]) -> SearchMatch {
        SearchMatch {
            path: steps.iter().map(|s| PathStep::from(*s)).collect(),
            kind: MatchKind::Value,
        }
    }

    #[test]
    fn case_insensitive_value_match() {
        let json = doc(json!({"name": "Jo", "nested": {"name": "Ann"}}));
        let state = ViewState::new();
        let mut task = search("jo", &json, &state, SearchOptions::new());
        assert_eq!(task.run(), SearchStatus::Done);
        assert_eq!(task.matches(), &[value_match(&["name"])]);
    }

    #[test]
    fn key_matches_at_every_depth() {
        let json = doc(json!({"name": "Jo", "nested": {"name": "Ann"}}));
        let state = ViewState::new();
        let mut task = search("nam", &json, &state, SearchOptions::new());
        task.run();
        assert_eq!(
            task.matches(),
            &[key_match(&["name"]), key_match(&["nested", "name"])]
        );
    }

    #[test]
    fn matches_null_bool_and_number_notation() {
        let json = doc(json!({"a": null, "b": true, "c": 25}));
        let state = ViewState::new();

        let mut task = search("null", &json, &state, SearchOptions::new());
        task.run();
        assert_eq!(task.matches(), &[value_match(&["a"])]);

        let mut task = search("2", &json, &state, SearchOptions::new());
        task.run();
        assert_eq!(task.matches(), &[value_match(&["c"])]);
    }

    #[test]
    fn traversal_follows_view_state_key_order() {
        let json = doc(json!({"a": "x", "b": "x"}));
        let mut state = ViewState::new();
        state.set_keys(&[], vec!["b".into(), "a".into()]);
        let mut task = search("x", &json, &state, SearchOptions::new());
        task.run();
        assert_eq!(
            task.matches(),
            &[value_match(&["b"]), value_match(&["a"])]
        );
    }

    #[test]
    fn empty_search_text_completes_with_zero_results() {
        let json = doc(json!({"a": 1}));
        let state = ViewState::new();
        let done = RefCell::new(Vec::new());
        let mut task = search(
            "",
            &json,
            &state,
            SearchOptions::new().on_done(|matches| done.borrow_mut().extend_from_slice(matches)),
        );
        assert_eq!(task.resume(), SearchStatus::Done);
        assert!(done.borrow().is_empty());
    }

    #[test]
    fn suspends_every_yield_every_visits() {
        // ten keys, each one visit for the key and one for the scalar
        let json = doc(json!({
            "k0": 0, "k1": 1, "k2": 2, "k3": 3, "k4": 4,
            "k5": 5, "k6": 6, "k7": 7, "k8": 8, "k9": 9
        }));
        let state = ViewState::new();
        let mut task = search("k", &json, &state, SearchOptions::new().yield_every(4));
        let mut suspensions = 0;
        while task.resume() == SearchStatus::Suspended {
            suspensions += 1;
        }
        assert!(suspensions >= 2);
        assert_eq!(task.matches().len(), 10);
    }

    #[test]
    fn progress_reports_only_new_matches() {
        let json = doc(json!({"a": "hit", "b": 1, "c": 2, "d": 3, "e": "hit"}));
        let state = ViewState::new();
        let reports = RefCell::new(Vec::new());
        let mut task = search(
            "hit",
            &json,
            &state,
            SearchOptions::new()
                .yield_every(2)
                .on_progress(|matches| reports.borrow_mut().push(matches.len())),
        );
        task.run();
        let reports = reports.borrow();
        // every report carries strictly more matches than the one before
        assert!(reports.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(task.matches().len(), 2);
    }

    #[test]
    fn on_done_fires_exactly_once() {
        let json = doc(json!({"a": "hit"}));
        let state = ViewState::new();
        let calls = RefCell::new(0);
        let mut task = search(
            "hit",
            &json,
            &state,
            SearchOptions::new().on_done(|_| *calls.borrow_mut() += 1),
        );
        assert_eq!(task.run(), SearchStatus::Done);
        assert_eq!(task.resume(), SearchStatus::Done);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn max_results_abandons_traversal() {
        let json = doc(json!(["hit", "hit", "hit", "hit"]));
        let state = ViewState::new();
        let done = RefCell::new(Vec::new());
        let mut task = search(
            "hit",
            &json,
            &state,
            SearchOptions::new()
                .max_results(2)
                .on_done(|matches| done.borrow_mut().extend_from_slice(matches)),
        );
        assert_eq!(task.run(), SearchStatus::Done);
        assert_eq!(done.borrow().len(), 2);
    }

    #[test]
    fn cancel_suppresses_on_done() {
        let json = doc(json!({"a": "hit", "b": "hit", "c": "hit"}));
        let state = ViewState::new();
        let calls = RefCell::new(0);
        let mut task = search(
            "hit",
            &json,
            &state,
            SearchOptions::new()
                .yield_every(1)
                .on_done(|_| *calls.borrow_mut() += 1),
        );
        let handle = task.handle();
        assert_eq!(task.resume(), SearchStatus::Suspended);
        handle.cancel();
        assert_eq!(task.resume(), SearchStatus::Cancelled);
        assert_eq!(task.resume(), SearchStatus::Cancelled);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn result_marks_matches_and_active() {
        let matches = vec![key_match(&["name"]), value_match(&["nested", "name"])];
        let result = SearchResult::new(matches, None);
        assert_eq!(result.active_index, Some(0));
        assert_eq!(
            result
                .matched_tree
                .descend(&key_match(&["name"]).path)
                .and_then(|n| n.key),
            Some(SearchMarker::Active)
        );
        assert_eq!(
            result
                .matched_tree
                .descend(&value_match(&["nested", "name"]).path)
                .and_then(|n| n.value),
            Some(SearchMarker::Match)
        );
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let matches = vec![
            value_match(&["a"]),
            value_match(&["b"]),
            value_match(&["c"]),
        ];
        let mut result = SearchResult::new(matches, None);

        result.next();
        assert_eq!(result.active_index, Some(1));
        result.next();
        assert_eq!(result.active_index, Some(2));
        result.next();
        assert_eq!(result.active_index, Some(0));

        result.previous();
        assert_eq!(result.active_index, Some(2));
        assert_eq!(
            result
                .matched_tree
                .descend(&value_match(&["c"]).path)
                .and_then(|n| n.value),
            Some(SearchMarker::Active)
        );
        // the old active marker is downgraded
        assert_eq!(
            result
                .matched_tree
                .descend(&value_match(&["a"]).path)
                .and_then(|n| n.value),
            Some(SearchMarker::Match)
        );
    }

    #[test]
    fn re_search_retains_surviving_active_match() {
        let first = SearchResult::new(
            vec![value_match(&["a"]), value_match(&["b"])],
            None,
        );
        let mut first = first;
        first.next();
        assert_eq!(first.active_match(), Some(&value_match(&["b"])));

        let second = SearchResult::new(
            vec![value_match(&["b"]), value_match(&["z"])],
            Some(&first),
        );
        assert_eq!(second.active_match(), Some(&value_match(&["b"])));

        let third = SearchResult::new(vec![value_match(&["z"])], Some(&second));
        assert_eq!(third.active_index, Some(0));
    }

    #[test]
    fn empty_result_has_no_active_match() {
        let mut result = SearchResult::new(Vec::new(), None);
        assert_eq!(result.active_index, None);
        result.next();
        assert_eq!(result.active_index, None);
    }
}
