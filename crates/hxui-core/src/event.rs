#![forbid(unsafe_code)]

//! Typed page events.
//!
//! Browser and hypermedia-library notifications are translated into
//! [`PageEvent`] values before any controller sees them. Controllers
//! subscribe to [`EventKind`] flags instead of string event names, which
//! makes fan-out explicit and testable without a live page.
//!
//! | Variant | Browser / htmx source |
//! |---------|-----------------------|
//! | `DocumentReady` | `DOMContentLoaded`, or boot on an already parsed page |
//! | `ConfigRequest` | `htmx:configRequest` |
//! | `RequestStart` | `htmx:beforeRequest` |
//! | `RequestEnd` | `htmx:afterRequest` |
//! | `SubtreeReplaced` | `htmx:afterSwap` |
//! | `Submit` | `submit` (capture phase, document-wide) |
//! | `KeyDown` | `keydown` (document-wide) |
//! | `Intersection` | `IntersectionObserver` callback |

use bitflags::bitflags;

use crate::dom::NodeId;

bitflags! {
    /// Event kinds a controller can subscribe to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventKind: u16 {
        const DOCUMENT_READY   = 0b0000_0001;
        const CONFIG_REQUEST   = 0b0000_0010;
        const REQUEST_START    = 0b0000_0100;
        const REQUEST_END      = 0b0000_1000;
        const SUBTREE_REPLACED = 0b0001_0000;
        const SUBMIT           = 0b0010_0000;
        const KEY_DOWN         = 0b0100_0000;
        const INTERSECTION     = 0b1000_0000;
    }
}

bitflags! {
    /// Keyboard modifier state at the time of a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Logical key, parsed from `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Backspace,
    Enter,
    Escape,
    /// A single printable character, case preserved.
    Char(char),
    /// Anything else, verbatim.
    Other(String),
}

impl Key {
    /// Parse a DOM `key` value.
    #[must_use]
    pub fn from_dom(raw: &str) -> Self {
        match raw {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Backspace" => Self::Backspace,
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            _ => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Self::Char(ch),
                    _ => Self::Other(raw.to_string()),
                }
            }
        }
    }
}

/// A key press, with the element that had focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Event target; `None` when the press was not attributed to an element.
    pub target: Option<NodeId>,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: Key, target: Option<NodeId>) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            target,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Ordered header collection of an outgoing request.
///
/// Names compare case-insensitively; setting an existing name replaces the
/// value in place and keeps the original position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestHeaders {
    entries: Vec<(String, String)>,
}

impl RequestHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self
            .entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One visibility change reported by the observation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
}

/// Lifecycle and native notifications consumed by controllers.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The document finished parsing.
    DocumentReady,
    /// An outgoing request is being configured; headers may be mutated.
    ConfigRequest {
        target: NodeId,
        headers: RequestHeaders,
    },
    /// A request is about to be issued on behalf of `target`.
    RequestStart { target: NodeId },
    /// A request issued on behalf of `target` completed (either way).
    RequestEnd { target: NodeId, successful: bool },
    /// The children of `root` were replaced by a server fragment.
    SubtreeReplaced { root: NodeId },
    /// A form is being submitted.
    Submit {
        form: NodeId,
        submitter: Option<NodeId>,
    },
    /// A key was pressed.
    KeyDown(KeyEvent),
    /// Observed elements changed visibility.
    Intersection(Vec<IntersectionEntry>),
}

impl PageEvent {
    /// Subscription flag for this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DocumentReady => EventKind::DOCUMENT_READY,
            Self::ConfigRequest { .. } => EventKind::CONFIG_REQUEST,
            Self::RequestStart { .. } => EventKind::REQUEST_START,
            Self::RequestEnd { .. } => EventKind::REQUEST_END,
            Self::SubtreeReplaced { .. } => EventKind::SUBTREE_REPLACED,
            Self::Submit { .. } => EventKind::SUBMIT,
            Self::KeyDown(_) => EventKind::KEY_DOWN,
            Self::Intersection(_) => EventKind::INTERSECTION,
        }
    }

    /// Stable short name, used in traces.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DocumentReady => "document_ready",
            Self::ConfigRequest { .. } => "config_request",
            Self::RequestStart { .. } => "request_start",
            Self::RequestEnd { .. } => "request_end",
            Self::SubtreeReplaced { .. } => "subtree_replaced",
            Self::Submit { .. } => "submit",
            Self::KeyDown(_) => "key_down",
            Self::Intersection(_) => "intersection",
        }
    }
}
