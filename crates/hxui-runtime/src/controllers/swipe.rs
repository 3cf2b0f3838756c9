#![forbid(unsafe_code)]

//! Keyboard swipe shortcuts and the in-flight indicator.
//!
//! Two coupled duties share this controller:
//!
//! - **Shortcuts.** Outside text-entry controls, the arrow keys (or `a`/`d`)
//!   submit the pass/like forms and Backspace submits the undo form. Every
//!   mapped key suppresses the browser default, even when the target form
//!   is missing from the page.
//! - **Indicator sync.** A request originating inside a swipe form (or the
//!   undo form) disables and dims every swipe submit button and shows the
//!   indicator; the matching request end reverses both.
//!
//! # Invariants
//!
//! 1. Forms are looked up when the key is pressed, never cached.
//! 2. A start/end pair for the same class of request leaves classes and
//!    disabled flags exactly as they were before the start.
//! 3. Requests from unrelated forms never touch swipe buttons or the
//!    indicator.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Target form absent | Key default suppressed, nothing submitted |
//! | Indicator container or indicator absent | Buttons still toggled |
//! | Request end never arrives | Buttons stay disabled until the next end |

use hxui_core::selector::{Selector, SelectorList};
use hxui_core::{ControllerConfig, Document, EventKind, Key, KeyEvent, NodeId, PageEvent};
use tracing::debug;

use crate::controller::{Context, Controller, Flow};

/// A keyboard-addressable swipe action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeAction {
    Pass,
    Like,
    Undo,
}

impl SwipeAction {
    /// Map a key to its action. Modifier state is not consulted.
    #[must_use]
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::ArrowLeft | Key::Char('a' | 'A') => Some(Self::Pass),
            Key::ArrowRight | Key::Char('d' | 'D') => Some(Self::Like),
            Key::Backspace => Some(Self::Undo),
            _ => None,
        }
    }

    /// Selector for the form this action submits.
    #[must_use]
    pub fn form_selector(self, config: &ControllerConfig) -> Selector {
        let swipe = &config.swipe;
        let form = Selector::tag("form");
        match self {
            Self::Pass => form.with_attr_eq(&config.attributes.swipe, &swipe.pass_action),
            Self::Like => form.with_attr_eq(&config.attributes.swipe, &swipe.like_action),
            Self::Undo => form.with_attr_suffix("action", &swipe.undo_action_suffix),
        }
    }
}

/// Visibility of the in-flight indicator, derived from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Idle,
    InFlight,
}

impl IndicatorState {
    /// Current state, or `None` when the indicator is not on the page.
    #[must_use]
    pub fn of(doc: &dyn Document, config: &ControllerConfig) -> Option<Self> {
        let indicator = find_indicator(doc, config)?;
        Some(if doc.has_class(indicator, &config.classes.hidden) {
            Self::Idle
        } else {
            Self::InFlight
        })
    }
}

fn is_text_entry(doc: &dyn Document, node: NodeId) -> bool {
    matches!(
        doc.tag_name(node).as_deref(),
        Some("input" | "textarea" | "select")
    )
}

fn find_indicator(doc: &dyn Document, config: &ControllerConfig) -> Option<NodeId> {
    let card = doc.element_by_id(&config.swipe.indicator_container_id)?;
    doc.query_first(card, &Selector::id(&config.swipe.indicator_id).into())
}

/// Submit the form addressed by `action`. Returns the form, if found.
pub fn submit_action(cx: &mut Context<'_>, action: SwipeAction) -> Option<NodeId> {
    let root = cx.doc.root();
    let form = cx
        .doc
        .query_first(root, &action.form_selector(cx.config).into())?;
    cx.doc.submit_form(form, cx.capabilities.submit_mode());
    Some(form)
}

/// Whether a request started by `target` belongs to a swipe form or the
/// undo form.
#[must_use]
pub fn is_swipe_request(doc: &dyn Document, config: &ControllerConfig, target: NodeId) -> bool {
    let Some(form) = doc.closest(target, &Selector::tag("form")) else {
        return false;
    };
    if doc.attribute(form, &config.attributes.swipe).is_some() {
        return true;
    }
    doc.attribute(form, "action")
        .is_some_and(|action| action.ends_with(&config.swipe.undo_action_suffix))
}

/// Toggle the swipe buttons and the indicator together.
pub fn set_in_flight(doc: &mut dyn Document, config: &ControllerConfig, in_flight: bool) {
    let root = doc.root();
    let forms = doc.query_all(
        root,
        &Selector::tag("form").with_attr(&config.attributes.swipe).into(),
    );
    let buttons: SelectorList = Selector::tag("button").with_attr_eq("type", "submit").into();
    for form in forms {
        for button in doc.query_all(form, &buttons) {
            doc.set_disabled(button, in_flight);
            if in_flight {
                doc.add_class(button, &config.classes.dimmed);
            } else {
                doc.remove_class(button, &config.classes.dimmed);
            }
        }
    }

    if let Some(indicator) = find_indicator(&*doc, config) {
        if in_flight {
            doc.remove_class(indicator, &config.classes.hidden);
        } else {
            doc.add_class(indicator, &config.classes.hidden);
        }
    }
}

/// Keyboard shortcuts plus in-flight indicator sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwipeController;

impl SwipeController {
    fn on_key(cx: &mut Context<'_>, key: &KeyEvent) -> Flow {
        if key.target.is_some_and(|t| is_text_entry(&*cx.doc, t)) {
            return Flow::Continue;
        }
        let Some(action) = SwipeAction::from_key(&key.key) else {
            return Flow::Continue;
        };
        match submit_action(cx, action) {
            Some(form) => debug!(?action, %form, "swipe shortcut submitted"),
            None => debug!(?action, "swipe shortcut has no target form"),
        }
        Flow::PreventDefault
    }
}

impl Controller for SwipeController {
    fn name(&self) -> &'static str {
        "swipe"
    }

    fn interests(&self) -> EventKind {
        EventKind::KEY_DOWN | EventKind::REQUEST_START | EventKind::REQUEST_END
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut PageEvent) -> Flow {
        let (target, in_flight) = match event {
            PageEvent::KeyDown(key) => return Self::on_key(cx, key),
            PageEvent::RequestStart { target } => (*target, true),
            PageEvent::RequestEnd { target, .. } => (*target, false),
            _ => return Flow::Continue,
        };
        if is_swipe_request(&*cx.doc, cx.config, target) {
            set_in_flight(cx.doc, cx.config, in_flight);
            debug!(%target, in_flight, "swipe indicator synced");
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxui_core::memory::{El, MemoryDocument};
    use hxui_core::event::Modifiers;
    use hxui_core::{Capabilities, SubmitMode};
    use pretty_assertions::assert_eq;

    struct Page {
        doc: MemoryDocument,
        pass: NodeId,
        like: NodeId,
        undo: NodeId,
        search: NodeId,
        query: NodeId,
    }

    fn swipe_form(action: &str) -> El {
        El::new("form")
            .attr("data-swipe", action)
            .attr("hx-post", &format!("/swipe/{action}/"))
            .child(El::new("button").attr("type", "submit").text(action))
    }

    fn page() -> Page {
        let mut doc = MemoryDocument::new();
        let card = doc.append(NodeId::ROOT, El::new("div").id("card"));
        doc.append(
            card,
            El::new("span").id("swipe-indicator").class("hidden"),
        );
        let pass = doc.append(card, swipe_form("pass"));
        let like = doc.append(card, swipe_form("like"));
        let undo = doc.append(
            NodeId::ROOT,
            El::new("form")
                .attr("action", "/swipe/undo/")
                .child(El::new("button").attr("type", "submit").text("Undo")),
        );
        let search = doc.append(
            NodeId::ROOT,
            El::new("form")
                .attr("action", "/search/")
                .child(El::new("input").attr("type", "text").attr("name", "q"))
                .child(El::new("button").attr("type", "submit").text("Go")),
        );
        let query = doc
            .query_first(search, &Selector::tag("input").into())
            .expect("query input");
        Page {
            doc,
            pass,
            like,
            undo,
            search,
            query,
        }
    }

    fn send(doc: &mut MemoryDocument, caps: Capabilities, mut event: PageEvent) -> Flow {
        let config = ControllerConfig::default();
        let mut cx = Context::new(doc, &config, caps);
        SwipeController.handle(&mut cx, &mut event)
    }

    fn press(doc: &mut MemoryDocument, key: &str, target: Option<NodeId>) -> Flow {
        let event = PageEvent::KeyDown(KeyEvent::new(Key::from_dom(key), target));
        send(doc, Capabilities::modern(), event)
    }

    fn first_button(doc: &MemoryDocument, form: NodeId) -> NodeId {
        doc.query_first(form, &Selector::tag("button").into())
            .expect("button")
    }

    #[test]
    fn key_mapping() {
        for (raw, expected) in [
            ("ArrowLeft", Some(SwipeAction::Pass)),
            ("a", Some(SwipeAction::Pass)),
            ("A", Some(SwipeAction::Pass)),
            ("ArrowRight", Some(SwipeAction::Like)),
            ("d", Some(SwipeAction::Like)),
            ("D", Some(SwipeAction::Like)),
            ("Backspace", Some(SwipeAction::Undo)),
            ("ArrowUp", None),
            ("s", None),
            ("Delete", None),
        ] {
            assert_eq!(SwipeAction::from_key(&Key::from_dom(raw)), expected, "key {raw:?}");
        }
    }

    #[test]
    fn like_shortcut_submits_exactly_the_like_form() {
        let mut p = page();
        assert_eq!(press(&mut p.doc, "d", None), Flow::PreventDefault);
        assert_eq!(p.doc.submissions(), &[(p.like, SubmitMode::RequestSubmit)]);
    }

    #[test]
    fn pass_and_undo_shortcuts() {
        let mut p = page();
        press(&mut p.doc, "ArrowLeft", Some(p.pass));
        press(&mut p.doc, "Backspace", None);
        assert_eq!(
            p.doc.submissions(),
            &[
                (p.pass, SubmitMode::RequestSubmit),
                (p.undo, SubmitMode::RequestSubmit)
            ]
        );
    }

    #[test]
    fn text_entry_focus_suppresses_shortcuts() {
        let mut p = page();
        assert_eq!(press(&mut p.doc, "d", Some(p.query)), Flow::Continue);
        assert_eq!(press(&mut p.doc, "Backspace", Some(p.query)), Flow::Continue);
        assert!(p.doc.submissions().is_empty());
    }

    #[test]
    fn modifiers_do_not_block_shortcuts() {
        let mut p = page();
        let event = PageEvent::KeyDown(
            KeyEvent::new(Key::Char('a'), None).with_modifiers(Modifiers::SHIFT),
        );
        assert_eq!(send(&mut p.doc, Capabilities::modern(), event), Flow::PreventDefault);
        assert_eq!(p.doc.submissions().len(), 1);
    }

    #[test]
    fn missing_form_still_prevents_default() {
        let mut doc = MemoryDocument::new();
        assert_eq!(press(&mut doc, "ArrowRight", None), Flow::PreventDefault);
        assert!(doc.submissions().is_empty());
    }

    #[test]
    fn unmapped_key_is_left_alone() {
        let mut p = page();
        assert_eq!(press(&mut p.doc, "Enter", None), Flow::Continue);
        assert!(p.doc.submissions().is_empty());
    }

    #[test]
    fn legacy_browser_falls_back_to_raw_submit() {
        let mut p = page();
        let event = PageEvent::KeyDown(KeyEvent::new(Key::ArrowRight, None));
        send(&mut p.doc, Capabilities::legacy(), event);
        assert_eq!(p.doc.submissions(), &[(p.like, SubmitMode::Raw)]);
    }

    #[test]
    fn request_classification_walks_to_the_enclosing_form() {
        let p = page();
        let config = ControllerConfig::default();
        assert!(is_swipe_request(&p.doc, &config, first_button(&p.doc, p.like)));
        assert!(is_swipe_request(&p.doc, &config, p.pass));
        assert!(is_swipe_request(&p.doc, &config, first_button(&p.doc, p.undo)));
        assert!(!is_swipe_request(&p.doc, &config, p.search));
        assert!(!is_swipe_request(&p.doc, &config, p.query));
        assert!(!is_swipe_request(&p.doc, &config, NodeId::ROOT));
    }

    #[test]
    fn start_and_end_round_trip_the_page_state() {
        let mut p = page();
        let config = ControllerConfig::default();
        let buttons = [first_button(&p.doc, p.pass), first_button(&p.doc, p.like)];
        let before: Vec<_> = buttons.iter().map(|b| p.doc.classes(*b)).collect();
        assert_eq!(IndicatorState::of(&p.doc, &config), Some(IndicatorState::Idle));

        let origin = buttons[1];
        send(&mut p.doc, Capabilities::modern(), PageEvent::RequestStart { target: origin });
        for b in buttons {
            assert!(p.doc.is_disabled(b));
            assert!(p.doc.has_class(b, "opacity-60"));
        }
        assert_eq!(IndicatorState::of(&p.doc, &config), Some(IndicatorState::InFlight));
        assert!(!p.doc.is_disabled(first_button(&p.doc, p.search)));

        send(
            &mut p.doc,
            Capabilities::modern(),
            PageEvent::RequestEnd {
                target: origin,
                successful: false,
            },
        );
        let after: Vec<_> = buttons.iter().map(|b| p.doc.classes(*b)).collect();
        assert_eq!(after, before);
        assert!(buttons.iter().all(|b| !p.doc.is_disabled(*b)));
        assert_eq!(IndicatorState::of(&p.doc, &config), Some(IndicatorState::Idle));
    }

    #[test]
    fn unrelated_requests_leave_swipe_ui_alone() {
        let mut p = page();
        let config = ControllerConfig::default();
        let go = first_button(&p.doc, p.search);
        send(&mut p.doc, Capabilities::modern(), PageEvent::RequestStart { target: go });
        assert!(!p.doc.is_disabled(first_button(&p.doc, p.like)));
        assert_eq!(IndicatorState::of(&p.doc, &config), Some(IndicatorState::Idle));
    }

    #[test]
    fn missing_indicator_still_toggles_buttons() {
        let mut doc = MemoryDocument::new();
        let form = doc.append(NodeId::ROOT, swipe_form("like"));
        let config = ControllerConfig::default();
        set_in_flight(&mut doc, &config, true);
        assert!(doc.is_disabled(first_button(&doc, form)));
        assert_eq!(IndicatorState::of(&doc, &config), None);
    }
}
