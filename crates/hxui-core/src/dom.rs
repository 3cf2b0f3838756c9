#![forbid(unsafe_code)]

//! Document adapter contract.
//!
//! Controllers never touch a live rendering environment directly. Every
//! lookup, mutation and environment side effect goes through the
//! [`Document`] trait, which is object safe so controllers can work against
//! `&mut dyn Document` regardless of the backing implementation
//! (browser DOM, [`MemoryDocument`](crate::memory::MemoryDocument), ...).
//!
//! # Invariants
//!
//! 1. **Lookups are live**: no adapter caches query results between calls.
//!    A [`NodeId`] obtained during one event may be stale during the next
//!    if the subtree was replaced in between; controllers re-query at event
//!    time instead of holding handles.
//! 2. **Query order is document order**: [`Document::query_all`] returns
//!    descendants of the scope in pre-order. The scope itself is excluded.
//! 3. **Unknown nodes are inert**: every read on an unknown or detached
//!    [`NodeId`] returns `None`/`false`/empty; every write is a no-op.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Stale handle | Subtree swapped out | Reads empty, writes ignored |
//! | No cookie store | Sandboxed frame | `cookie_string()` is empty |
//! | Dialog unavailable | Headless host | `confirm()` decides per adapter |

use core::fmt;

use crate::selector::{Selector, SelectorList};

/// Opaque handle to an element owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Handle that names the document itself.
    pub const ROOT: Self = Self(0);

    /// Wrap a raw adapter-assigned id.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this handle names the document root.
    #[inline]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Document loading phase, mirroring `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    /// The document is still being parsed.
    Loading,
    /// Parsing finished; sub-resources may still be loading.
    Interactive,
    /// Everything finished loading.
    #[default]
    Complete,
}

impl ReadyState {
    /// Parse the DOM string form. Unknown values are treated as `Complete`.
    #[must_use]
    pub fn from_dom(raw: &str) -> Self {
        match raw {
            "loading" => Self::Loading,
            "interactive" => Self::Interactive,
            _ => Self::Complete,
        }
    }

    /// Whether controllers may scan the document now.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// How a form submission is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Validating submission that fires the `submit` event (`requestSubmit`).
    RequestSubmit,
    /// Raw submission that bypasses validation and the `submit` event.
    Raw,
}

/// Margin applied to the observation root, in CSS order
/// (top, right, bottom, left). Values are percentages of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top_percent: f32,
    pub right_percent: f32,
    pub bottom_percent: f32,
    pub left_percent: f32,
}

impl RootMargin {
    /// Margin that only moves the bottom edge.
    #[must_use]
    pub const fn bottom(percent: f32) -> Self {
        Self {
            top_percent: 0.0,
            right_percent: 0.0,
            bottom_percent: percent,
            left_percent: 0.0,
        }
    }

    /// Render as a CSS `rootMargin` string, e.g. `"0px 0px -10% 0px"`.
    #[must_use]
    pub fn to_css(&self) -> String {
        fn side(v: f32) -> String {
            if v == 0.0 {
                "0px".to_string()
            } else {
                format!("{v}%")
            }
        }
        format!(
            "{} {} {} {}",
            side(self.top_percent),
            side(self.right_percent),
            side(self.bottom_percent),
            side(self.left_percent)
        )
    }
}

/// Options for visibility observation of a single element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions {
    /// Fraction of the element that must be visible, in `[0, 1]`.
    pub threshold: f32,
    /// Shrink/grow of the viewport used for the intersection test.
    pub root_margin: RootMargin,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            threshold: 0.12,
            root_margin: RootMargin::bottom(-10.0),
        }
    }
}

/// Injectable view of the page.
///
/// Implementations must uphold the module-level invariants. All methods take
/// `&self`/`&mut self` so the trait stays object safe.
pub trait Document {
    // --- query -----------------------------------------------------------

    /// Handle of the document itself.
    fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Current loading phase.
    fn ready_state(&self) -> ReadyState;

    /// Descendants of `scope` matching `selector`, in document order.
    fn query_all(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId>;

    /// First descendant of `scope` matching `selector`.
    fn query_first(&self, scope: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId>;

    /// Element with the given `id` attribute anywhere in the document.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Lowercase tag name, `None` for the root or unknown nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    // --- attributes and classes ------------------------------------------

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    // --- content and form state ------------------------------------------

    fn text_content(&self, node: NodeId) -> String;

    fn set_text_content(&mut self, node: NodeId, text: &str);

    /// Current `value` of an input-like control.
    fn value(&self, node: NodeId) -> String;

    fn set_value(&mut self, node: NodeId, value: &str);

    fn is_disabled(&self, node: NodeId) -> bool;

    fn set_disabled(&mut self, node: NodeId, disabled: bool);

    /// Set one inline style property (e.g. `width` to `42%`).
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    // --- environment -----------------------------------------------------

    /// Raw `document.cookie` string.
    fn cookie_string(&self) -> String;

    /// Ask the user to confirm `message`. Blocks the calling handler.
    fn confirm(&mut self, message: &str) -> bool;

    /// Start visibility observation of `node`. Observing twice is a no-op.
    fn observe(&mut self, node: NodeId, options: &ObserveOptions);

    /// Stop visibility observation of `node`.
    fn unobserve(&mut self, node: NodeId);

    /// Submit `form` using the given mechanism.
    fn submit_form(&mut self, form: NodeId, mode: SubmitMode);
}
