#![forbid(unsafe_code)]

//! In-memory reference [`Document`].
//!
//! `MemoryDocument` is a small element arena that implements the full
//! adapter contract without a browser. It backs the unit and integration
//! tests and can drive controllers from any host that keeps its own
//! element model.
//!
//! Reflection rules follow the DOM where controllers can observe them:
//!
//! - `class` is an ordinary attribute; class helpers edit its token list.
//! - `disabled` reflects the `disabled` attribute.
//! - `value` starts from the `value` attribute and diverges once set.
//! - `set_text_content` detaches all children.
//! - Swapped-out subtrees stay readable as detached trees until
//!   [`MemoryDocument::prune`].
//!
//! Environment side effects (confirmation dialogs, visibility observation,
//! form submission) are recorded so tests can assert on them. Confirmation
//! answers are scripted with [`MemoryDocument::queue_confirm`].
//!
//! # Example
//!
//! ```
//! use hxui_core::dom::Document;
//! use hxui_core::memory::{El, MemoryDocument};
//! use hxui_core::selector::Selector;
//!
//! let mut doc = MemoryDocument::new();
//! let form = doc.append(
//!     doc.root(),
//!     El::new("form")
//!         .attr("data-swipe", "like")
//!         .child(El::new("button").attr("type", "submit").text("Like")),
//! );
//! let found = doc.query_first(doc.root(), &Selector::attr("data-swipe").into());
//! assert_eq!(found, Some(form));
//! ```

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::dom::{Document, NodeId, ObserveOptions, ReadyState, SubmitMode};
use crate::selector::{Selector, SelectorList};

/// Declarative element description used to build memory trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct El {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<El>,
}

impl El {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
        self
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Append one class token.
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        let joined = match self.attrs.iter().find(|(n, _)| n == "class") {
            Some((_, existing)) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attr("class", &joined)
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    #[must_use]
    pub fn child(mut self, child: El) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    value: Option<String>,
    styles: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Arena-backed document for tests and headless hosts.
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: AHashMap<NodeId, Node>,
    next_id: u64,
    ready_state: ReadyState,
    cookie: String,
    confirm_answers: VecDeque<bool>,
    default_confirm: bool,
    confirmations: Vec<String>,
    observed: Vec<NodeId>,
    observe_options: Option<ObserveOptions>,
    submissions: Vec<(NodeId, SubmitMode)>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Empty, fully loaded document.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = AHashMap::new();
        nodes.insert(
            NodeId::ROOT,
            Node {
                tag: "#document".to_string(),
                ..Node::default()
            },
        );
        Self {
            nodes,
            next_id: 1,
            ready_state: ReadyState::Complete,
            cookie: String::new(),
            confirm_answers: VecDeque::new(),
            default_confirm: true,
            confirmations: Vec::new(),
            observed: Vec::new(),
            observe_options: None,
            submissions: Vec::new(),
        }
    }

    // --- building --------------------------------------------------------

    /// Append `el` (recursively) as the last child of `parent`.
    ///
    /// Appending to an unknown parent still allocates the subtree, detached.
    pub fn append(&mut self, parent: NodeId, el: El) -> NodeId {
        let parent = self.nodes.contains_key(&parent).then_some(parent);
        self.insert_tree(parent, el)
    }

    /// Replace every child of `node` with `content`. The old subtrees are
    /// detached, not destroyed: their handles stay readable and their
    /// ancestor chains stop at the detached top. Returns the new top-level
    /// children.
    pub fn replace_children(&mut self, node: NodeId, content: Vec<El>) -> Vec<NodeId> {
        if !self.nodes.contains_key(&node) {
            return Vec::new();
        }
        self.detach_children(node);
        content
            .into_iter()
            .map(|el| self.insert_tree(Some(node), el))
            .collect()
    }

    /// Detach `node` with its subtree. The root cannot be removed.
    pub fn remove(&mut self, node: NodeId) {
        if node.is_root() || !self.nodes.contains_key(&node) {
            return;
        }
        let parent = self.nodes.get_mut(&node).and_then(|n| n.parent.take());
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|c| *c != node);
        }
        self.forget_observed(node);
    }

    /// Drop every detached subtree from the arena.
    ///
    /// Returns the number of elements freed.
    pub fn prune(&mut self) -> usize {
        let before = self.nodes.len();
        let attached: AHashSet<NodeId> = self
            .descendants(NodeId::ROOT)
            .into_iter()
            .chain([NodeId::ROOT])
            .collect();
        self.nodes.retain(|id, _| attached.contains(id));
        before - self.nodes.len()
    }

    fn insert_tree(&mut self, parent: Option<NodeId>, el: El) -> NodeId {
        let id = NodeId::from_raw(self.next_id);
        self.next_id += 1;
        let El {
            tag,
            attrs,
            text,
            children,
        } = el;
        self.nodes.insert(
            id,
            Node {
                tag,
                attrs,
                text,
                parent,
                ..Node::default()
            },
        );
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.push(id);
        }
        for child in children {
            self.insert_tree(Some(id), child);
        }
        id
    }

    fn detach_children(&mut self, node: NodeId) {
        let children = self
            .nodes
            .get_mut(&node)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        for child in children {
            if let Some(n) = self.nodes.get_mut(&child) {
                n.parent = None;
            }
            self.forget_observed(child);
        }
    }

    fn forget_observed(&mut self, top: NodeId) {
        let mut gone = self.descendants(top);
        gone.push(top);
        self.observed.retain(|o| !gone.contains(o));
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.nodes.get(&scope) else {
            return out;
        };
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(n) = self.nodes.get(&id) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn element(&self, node: NodeId) -> Option<&Node> {
        if node.is_root() {
            return None;
        }
        self.nodes.get(&node)
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        if node.is_root() {
            return None;
        }
        self.nodes.get_mut(&node)
    }

    // --- environment scripting -------------------------------------------

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn set_cookie_string(&mut self, cookie: impl Into<String>) {
        self.cookie = cookie.into();
    }

    /// Queue the answer for the next confirmation dialog.
    pub fn queue_confirm(&mut self, accept: bool) {
        self.confirm_answers.push_back(accept);
    }

    /// Answer used once the queue is exhausted (defaults to accept).
    pub fn set_default_confirm(&mut self, accept: bool) {
        self.default_confirm = accept;
    }

    // --- inspection ------------------------------------------------------

    /// Messages shown in confirmation dialogs, oldest first.
    #[must_use]
    pub fn confirmations(&self) -> &[String] {
        &self.confirmations
    }

    /// Elements currently under visibility observation.
    #[must_use]
    pub fn observed(&self) -> &[NodeId] {
        &self.observed
    }

    #[must_use]
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    /// Options passed to the most recent `observe` call.
    #[must_use]
    pub fn last_observe_options(&self) -> Option<ObserveOptions> {
        self.observe_options
    }

    /// Forms submitted programmatically, oldest first.
    #[must_use]
    pub fn submissions(&self) -> &[(NodeId, SubmitMode)] {
        &self.submissions
    }

    /// Inline style property of `node`.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)?
            .styles
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Class tokens of `node`, in order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.element(node)
            .and_then(|n| n.attr("class"))
            .map(|list| list.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Whether `node` is still attached to this document.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id.is_root() {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// First element in the whole document matching `selector`.
    #[must_use]
    pub fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.query_first(NodeId::ROOT, &selector.clone().into())
    }

    /// Number of attached elements, excluding the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descendants(NodeId::ROOT).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Document for MemoryDocument {
    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn query_all(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|n| selector.matches(&n.tag, |name| n.attr(name)))
            })
            .collect()
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.element(id)?;
            if selector.matches(&n.tag, |name| n.attr(name)) {
                return Some(id);
            }
            current = n.parent;
        }
        None
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .find(|n| self.nodes.get(n).and_then(|el| el.attr("id")) == Some(id))
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|n| n.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.attr(name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.element_mut(node) {
            n.set_attr(name, value);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|n| n.has_class(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let Some(n) = self.element_mut(node) else {
            return;
        };
        if n.has_class(class) {
            return;
        }
        let joined = match n.attr("class") {
            Some(list) if !list.trim().is_empty() => format!("{} {class}", list.trim_end()),
            _ => class.to_string(),
        };
        n.set_attr("class", &joined);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(n) = self.element_mut(node) else {
            return;
        };
        let Some(list) = n.attr("class") else {
            return;
        };
        let kept: Vec<&str> = list
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        let joined = kept.join(" ");
        n.set_attr("class", &joined);
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(n) = self.nodes.get(&node) else {
            return String::new();
        };
        let mut out = n.text.clone();
        for child in &n.children {
            out.push_str(&self.text_content(*child));
        }
        out
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if self.element(node).is_none() {
            return;
        }
        self.detach_children(node);
        if let Some(n) = self.element_mut(node) {
            n.text = text.to_string();
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.element(node)
            .map(|n| {
                n.value
                    .clone()
                    .or_else(|| n.attr("value").map(str::to_string))
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.element_mut(node) {
            n.value = Some(value.to_string());
        }
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.element(node)
            .is_some_and(|n| n.attr("disabled").is_some())
    }

    fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(n) = self.element_mut(node) {
            if disabled {
                n.set_attr("disabled", "");
            } else {
                n.remove_attr("disabled");
            }
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.element_mut(node) {
            match n.styles.iter_mut().find(|(p, _)| p == property) {
                Some(entry) => entry.1 = value.to_string(),
                None => n.styles.push((property.to_string(), value.to_string())),
            }
        }
    }

    fn cookie_string(&self) -> String {
        self.cookie.clone()
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.confirm_answers
            .pop_front()
            .unwrap_or(self.default_confirm)
    }

    fn observe(&mut self, node: NodeId, options: &ObserveOptions) {
        if self.element(node).is_none() {
            return;
        }
        self.observe_options = Some(*options);
        if !self.observed.contains(&node) {
            self.observed.push(node);
        }
    }

    fn unobserve(&mut self, node: NodeId) {
        self.observed.retain(|o| *o != node);
    }

    fn submit_form(&mut self, form: NodeId, mode: SubmitMode) {
        if self.element(form).is_some() {
            self.submissions.push((form, mode));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::submit_controls;
    use pretty_assertions::assert_eq;

    fn sample() -> (MemoryDocument, NodeId) {
        let mut doc = MemoryDocument::new();
        let form = doc.append(
            NodeId::ROOT,
            El::new("form").attr("action", "/swipe/undo/").children([
                El::new("input").attr("type", "text").attr("value", "hi"),
                El::new("button").attr("type", "submit").text("Go"),
                El::new("div").child(El::new("input").attr("type", "submit").attr("value", "Send")),
            ]),
        );
        (doc, form)
    }

    #[test]
    fn query_all_is_document_order_and_excludes_scope() {
        let (doc, form) = sample();
        let controls = doc.query_all(form, &submit_controls());
        let tags: Vec<_> = controls.iter().filter_map(|c| doc.tag_name(*c)).collect();
        assert_eq!(tags, vec!["button".to_string(), "input".to_string()]);

        let forms = doc.query_all(form, &Selector::tag("form").into());
        assert!(forms.is_empty());
        let forms = doc.query_all(NodeId::ROOT, &Selector::tag("form").into());
        assert_eq!(forms, vec![form]);
    }

    #[test]
    fn closest_includes_self_and_stops_at_root() {
        let (doc, form) = sample();
        let submit = doc.query_all(form, &submit_controls())[1];
        assert_eq!(doc.closest(submit, &Selector::tag("form")), Some(form));
        assert_eq!(doc.closest(form, &Selector::tag("form")), Some(form));
        assert_eq!(doc.closest(form, &Selector::tag("section")), None);
        assert_eq!(doc.closest(NodeId::ROOT, &Selector::any()), None);
    }

    #[test]
    fn class_helpers_edit_token_list() {
        let mut doc = MemoryDocument::new();
        let el = doc.append(NodeId::ROOT, El::new("div").class("a").class("b"));
        doc.add_class(el, "c");
        doc.add_class(el, "a");
        assert_eq!(doc.classes(el), vec!["a", "b", "c"]);
        doc.remove_class(el, "b");
        assert_eq!(doc.attribute(el, "class").as_deref(), Some("a c"));
        assert!(doc.has_class(el, "c"));
        assert!(!doc.has_class(el, "b"));
    }

    #[test]
    fn disabled_and_value_reflection() {
        let (mut doc, form) = sample();
        let text = doc.query_first(form, &Selector::tag("input").into()).unwrap();
        assert_eq!(doc.value(text), "hi");
        doc.set_value(text, "bye");
        assert_eq!(doc.value(text), "bye");
        assert_eq!(doc.attribute(text, "value").as_deref(), Some("hi"));

        assert!(!doc.is_disabled(text));
        doc.set_disabled(text, true);
        assert!(doc.is_disabled(text));
        assert_eq!(doc.attribute(text, "disabled").as_deref(), Some(""));
        doc.set_disabled(text, false);
        assert!(!doc.is_disabled(text));
    }

    #[test]
    fn replace_children_detaches_old_subtrees() {
        let (mut doc, form) = sample();
        let old = doc.query_all(form, &submit_controls());
        doc.observe(old[1], &ObserveOptions::default());
        let fresh = doc.replace_children(form, vec![El::new("p").text("done")]);
        assert_eq!(fresh.len(), 1);
        assert!(!doc.contains(old[0]));
        assert!(doc.observed().is_empty());
        assert_eq!(doc.text_content(form), "done");
        assert!(doc.query_all(NodeId::ROOT, &submit_controls()).is_empty());

        // Detached handles stay readable and keep their own ancestry.
        assert_eq!(doc.attribute(old[0], "type").as_deref(), Some("submit"));
        let wrapper = doc.closest(old[1], &Selector::tag("div"));
        assert!(wrapper.is_some());
        assert_eq!(doc.closest(old[1], &Selector::tag("form")), None);
    }

    #[test]
    fn remove_detaches_and_prune_frees() {
        let (mut doc, form) = sample();
        let button = doc.query_first(form, &Selector::tag("button").into()).unwrap();
        assert_eq!(doc.len(), 5);
        doc.remove(button);
        assert!(!doc.contains(button));
        assert!(doc.contains(form));
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.text_content(button), "Go");
        doc.remove(NodeId::ROOT);
        assert!(doc.contains(form));

        assert_eq!(doc.prune(), 1);
        assert_eq!(doc.tag_name(button), None);
        assert_eq!(doc.prune(), 0);
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn text_content_concatenates_and_set_replaces_children() {
        let mut doc = MemoryDocument::new();
        let b = doc.append(
            NodeId::ROOT,
            El::new("button").text("Save ").child(El::new("span").text("now")),
        );
        assert_eq!(doc.text_content(b), "Save now");
        doc.set_text_content(b, "Saving…");
        assert_eq!(doc.text_content(b), "Saving…");
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn confirm_uses_queue_then_default() {
        let mut doc = MemoryDocument::new();
        doc.queue_confirm(false);
        assert!(!doc.confirm("one"));
        assert!(doc.confirm("two"));
        doc.set_default_confirm(false);
        assert!(!doc.confirm("three"));
        assert_eq!(doc.confirmations(), &["one", "two", "three"]);
    }

    #[test]
    fn element_by_id_and_root_is_inert() {
        let mut doc = MemoryDocument::new();
        let card = doc.append(NodeId::ROOT, El::new("section").id("card"));
        assert_eq!(doc.element_by_id("card"), Some(card));
        assert_eq!(doc.element_by_id("nope"), None);
        assert_eq!(doc.tag_name(NodeId::ROOT), None);
        doc.add_class(NodeId::ROOT, "x");
        assert!(!doc.has_class(NodeId::ROOT, "x"));
    }

    #[test]
    fn submissions_and_observation_are_recorded() {
        let (mut doc, form) = sample();
        doc.submit_form(form, SubmitMode::Raw);
        doc.submit_form(NodeId::from_raw(999), SubmitMode::Raw);
        assert_eq!(doc.submissions(), &[(form, SubmitMode::Raw)]);

        doc.observe(form, &ObserveOptions::default());
        doc.observe(form, &ObserveOptions::default());
        assert_eq!(doc.observed(), &[form]);
        doc.unobserve(form);
        assert!(!doc.is_observed(form));
    }
}
