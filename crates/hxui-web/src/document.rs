#![forbid(unsafe_code)]

//! Live DOM adapter.
//!
//! Elements are named by [`NodeId`]s stamped onto the JS object under a
//! private property, so the same element always maps to the same id no
//! matter how it was reached. The registry only holds elements that were
//! handed out to controllers; disconnected entries are pruned after every
//! swap.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Stale or unknown id | Reads return empty/`None`, writes are no-ops |
//! | Invalid selector | Logged at warn, treated as no match |
//! | `confirm()` throws (sandboxed frame) | Logged at warn, treated as accepted |
//! | No observer installed | `observe`/`unobserve` are no-ops |

use std::cell::RefCell;

use ahash::AHashMap;
use hxui_core::selector::{Selector, SelectorList};
use hxui_core::{Document, NodeId, ObserveOptions, ReadyState, SubmitMode};
use js_sys::Reflect;
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    IntersectionObserver, NodeList,
};

const NODE_ID_PROPERTY: &str = "__hxuiNodeId";

fn js_error(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

#[derive(Default)]
struct Registry {
    next: u64,
    elements: AHashMap<NodeId, Element>,
}

/// [`Document`] over the page's live DOM.
pub struct WebDocument {
    window: web_sys::Window,
    document: web_sys::Document,
    registry: RefCell<Registry>,
    observer: Option<IntersectionObserver>,
    pending_submits: Vec<(HtmlFormElement, SubmitMode)>,
}

impl std::fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDocument")
            .field("registered", &self.registry.borrow().elements.len())
            .field("observer", &self.observer.is_some())
            .field("pending_submits", &self.pending_submits.len())
            .finish()
    }
}

impl WebDocument {
    pub fn new(window: web_sys::Window, document: web_sys::Document) -> Self {
        Self {
            window,
            document,
            registry: RefCell::new(Registry {
                next: 1,
                elements: AHashMap::new(),
            }),
            observer: None,
            pending_submits: Vec::new(),
        }
    }

    /// Install the shared visibility observer.
    pub fn set_observer(&mut self, observer: IntersectionObserver) {
        self.observer = Some(observer);
    }

    /// Id for `element`, stamping a fresh one on first sight.
    pub fn node_id(&self, element: &Element) -> NodeId {
        let key = JsValue::from_str(NODE_ID_PROPERTY);
        let mut registry = self.registry.borrow_mut();
        if let Some(raw) = Reflect::get(element, &key).ok().and_then(|v| v.as_f64()) {
            let id = NodeId::from_raw(raw as u64);
            registry.elements.entry(id).or_insert_with(|| element.clone());
            return id;
        }
        let id = NodeId::from_raw(registry.next);
        registry.next += 1;
        if let Err(err) = Reflect::set(element, &key, &JsValue::from_f64(id.raw() as f64)) {
            warn!(error = %js_error(&err), "could not stamp node id");
        }
        registry.elements.insert(id, element.clone());
        id
    }

    /// Id for an event target, when it is an element.
    pub fn target_id(&self, target: Option<web_sys::EventTarget>) -> Option<NodeId> {
        let element = target?.dyn_into::<Element>().ok()?;
        Some(self.node_id(&element))
    }

    /// Drop registry entries for elements no longer in the document.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&self) -> usize {
        let mut registry = self.registry.borrow_mut();
        let before = registry.elements.len();
        registry.elements.retain(|_, el| el.is_connected());
        before - registry.elements.len()
    }

    /// Take the submissions requested since the last call.
    pub fn take_submissions(&mut self) -> Vec<(HtmlFormElement, SubmitMode)> {
        std::mem::take(&mut self.pending_submits)
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.registry.borrow().elements.get(&node).cloned()
    }

    fn collect(&self, list: &NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .map(|el| self.node_id(&el))
            .collect()
    }
}

impl Document for WebDocument {
    fn ready_state(&self) -> ReadyState {
        Reflect::get(&self.document, &JsValue::from_str("readyState"))
            .ok()
            .and_then(|v| v.as_string())
            .map(|s| ReadyState::from_dom(&s))
            .unwrap_or_default()
    }

    fn query_all(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        let css = selector.to_css();
        let result = if scope.is_root() {
            self.document.query_selector_all(&css)
        } else {
            let Some(el) = self.element(scope) else {
                return Vec::new();
            };
            el.query_selector_all(&css)
        };
        match result {
            Ok(list) => self.collect(&list),
            Err(err) => {
                warn!(%css, error = %js_error(&err), "selector rejected");
                Vec::new()
            }
        }
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let el = self.element(node)?;
        match el.closest(&selector.to_css()) {
            Ok(found) => found.map(|f| self.node_id(&f)),
            Err(err) => {
                warn!(selector = %selector, error = %js_error(&err), "selector rejected");
                None
            }
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let el = self.document.get_element_by_id(id)?;
        Some(self.node_id(&el))
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        Some(self.element(node)?.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element(node)
            && let Err(err) = el.set_attribute(name, value)
        {
            warn!(%node, attribute = name, error = %js_error(&err), "set_attribute failed");
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node)
            && let Err(err) = el.class_list().add_1(class)
        {
            warn!(%node, class, error = %js_error(&err), "classList.add failed");
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node)
            && let Err(err) = el.class_list().remove_1(class)
        {
            warn!(%node, class, error = %js_error(&err), "classList.remove failed");
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|el| el.text_content())
            .unwrap_or_default()
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element(node) {
            el.set_text_content(Some(text));
        }
    }

    fn value(&self, node: NodeId) -> String {
        let Some(el) = self.element(node) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
            button.value()
        } else {
            el.get_attribute("value").unwrap_or_default()
        }
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        let Some(el) = self.element(node) else {
            return;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
            button.set_value(value);
        } else if let Err(err) = el.set_attribute("value", value) {
            warn!(%node, error = %js_error(&err), "value write failed");
        }
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        let Some(el) = self.element(node) else {
            return false;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.disabled()
        } else if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
            button.disabled()
        } else {
            el.has_attribute("disabled")
        }
    }

    fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        let Some(el) = self.element(node) else {
            return;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        } else if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else {
            let result = if disabled {
                el.set_attribute("disabled", "")
            } else {
                el.remove_attribute("disabled")
            };
            if let Err(err) = result {
                warn!(%node, error = %js_error(&err), "disabled write failed");
            }
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.element(node) else {
            return;
        };
        let Some(html) = el.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(err) = html.style().set_property(property, value) {
            warn!(%node, property, error = %js_error(&err), "style write failed");
        }
    }

    fn cookie_string(&self) -> String {
        Reflect::get(&self.document, &JsValue::from_str("cookie"))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }

    fn confirm(&mut self, message: &str) -> bool {
        match self.window.confirm_with_message(message) {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(error = %js_error(&err), "confirm dialog unavailable; proceeding");
                true
            }
        }
    }

    fn observe(&mut self, node: NodeId, _options: &ObserveOptions) {
        if let (Some(observer), Some(el)) = (&self.observer, self.element(node)) {
            observer.observe(&el);
        }
    }

    fn unobserve(&mut self, node: NodeId) {
        if let (Some(observer), Some(el)) = (&self.observer, self.element(node)) {
            observer.unobserve(&el);
        }
    }

    fn submit_form(&mut self, form: NodeId, mode: SubmitMode) {
        let Some(form_el) = self
            .element(form)
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
        else {
            return;
        };
        self.pending_submits.push((form_el, mode));
    }
}
