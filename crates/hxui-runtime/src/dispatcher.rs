#![forbid(unsafe_code)]

//! Explicit event bus.
//!
//! Controllers subscribe to the [`Dispatcher`] with an [`EventKind`] mask;
//! dispatch fans an event out to matching subscribers in registration
//! order. This replaces ambient listener registration with an ordered,
//! inspectable list.
//!
//! # Invariants
//!
//! 1. **Registration order**: subscribers see an event in the order they
//!    were subscribed. The standard set registers the submission guard
//!    before the loading-state controller, so a declined confirmation is
//!    decided before any control is disabled.
//! 2. **Cancel stops fan-out**: once a controller returns [`Flow::Cancel`],
//!    no later subscriber sees the event.
//! 3. **Default prevention is sticky**: any `PreventDefault` or `Cancel`
//!    marks the outcome as default-prevented.
//! 4. **Bounded trace**: at most [`TRACE_CAPACITY`] records are retained;
//!    the oldest record is evicted first.

use std::collections::VecDeque;

use hxui_core::{EventKind, PageEvent};
use tracing::trace;

use crate::controller::{Context, Controller, Flow};
use crate::controllers::{
    LoadingState, ProgressRenderer, RequestAuthenticator, RevealController, SubmissionGuard,
    SwipeController,
};

/// Number of dispatch records kept in the trace ring.
pub const TRACE_CAPACITY: usize = 256;

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// The browser default action should be suppressed.
    pub default_prevented: bool,
    /// Controller that stopped fan-out, if any.
    pub cancelled_by: Option<&'static str>,
    /// Controllers that received the event, in order.
    pub delivered_to: Vec<&'static str>,
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_by.is_some()
    }
}

/// One dispatched event as seen by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    /// Monotonic dispatch sequence number, starting at 1.
    pub seq: u64,
    pub event: &'static str,
    /// `(controller, flow)` pairs in delivery order.
    pub deliveries: Vec<(&'static str, Flow)>,
    pub default_prevented: bool,
}

/// Ring buffer of recent dispatches.
#[derive(Debug, Clone, Default)]
pub struct DispatchTrace {
    records: VecDeque<TraceRecord>,
    next_seq: u64,
}

impl DispatchTrace {
    fn push(&mut self, event: &'static str, deliveries: Vec<(&'static str, Flow)>, prevented: bool) {
        self.next_seq += 1;
        if self.records.len() == TRACE_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(TraceRecord {
            seq: self.next_seq,
            event,
            deliveries,
            default_prevented: prevented,
        });
    }

    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total dispatches, including evicted ones.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.next_seq
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Export retained records as JSON Lines, oldest first.
    #[cfg(feature = "event-trace")]
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            let deliveries: Vec<serde_json::Value> = record
                .deliveries
                .iter()
                .map(|(name, flow)| serde_json::json!({ "controller": name, "flow": flow.name() }))
                .collect();
            let line = serde_json::json!({
                "seq": record.seq,
                "event": record.event,
                "deliveries": deliveries,
                "default_prevented": record.default_prevented,
            });
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}

struct Subscriber {
    controller: Box<dyn Controller>,
    interests: EventKind,
}

/// Ordered fan-out of [`PageEvent`]s to subscribed controllers.
#[derive(Default)]
pub struct Dispatcher {
    subscribers: Vec<Subscriber>,
    trace: DispatchTrace,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.subscriptions().collect::<Vec<_>>())
            .field("traced", &self.trace.len())
            .finish()
    }
}

impl Dispatcher {
    /// Empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus with the six page controllers in their standard order.
    #[must_use]
    pub fn standard() -> Self {
        let mut bus = Self::new();
        bus.subscribe(RequestAuthenticator)
            .subscribe(SubmissionGuard)
            .subscribe(LoadingState)
            .subscribe(ProgressRenderer)
            .subscribe(RevealController)
            .subscribe(SwipeController);
        bus
    }

    /// Append a controller. Its interests are captured now.
    pub fn subscribe(&mut self, controller: impl Controller + 'static) -> &mut Self {
        let interests = controller.interests();
        self.subscribers.push(Subscriber {
            controller: Box::new(controller),
            interests,
        });
        self
    }

    /// `(name, interests)` of every subscriber, in order.
    pub fn subscriptions(&self) -> impl Iterator<Item = (&'static str, EventKind)> + '_ {
        self.subscribers
            .iter()
            .map(|s| (s.controller.name(), s.interests))
    }

    #[must_use]
    pub fn trace(&self) -> &DispatchTrace {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut DispatchTrace {
        &mut self.trace
    }

    /// Fan `event` out to every interested controller.
    pub fn dispatch(&mut self, cx: &mut Context<'_>, event: &mut PageEvent) -> DispatchOutcome {
        let kind = event.kind();
        let name = event.name();
        let mut outcome = DispatchOutcome::default();
        let mut deliveries = Vec::new();

        for sub in &mut self.subscribers {
            if !sub.interests.intersects(kind) {
                continue;
            }
            let controller = sub.controller.name();
            let flow = sub.controller.handle(cx, event);
            trace!(event = name, controller, flow = flow.name(), "dispatched");
            deliveries.push((controller, flow));
            outcome.delivered_to.push(controller);
            outcome.default_prevented |= flow.prevents_default();
            if flow == Flow::Cancel {
                outcome.cancelled_by = Some(controller);
                break;
            }
        }

        self.trace.push(name, deliveries, outcome.default_prevented);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxui_core::memory::MemoryDocument;
    use hxui_core::{Capabilities, ControllerConfig, NodeId};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        interests: EventKind,
        flow: Flow,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Controller for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn interests(&self) -> EventKind {
            self.interests
        }

        fn handle(&mut self, _cx: &mut Context<'_>, _event: &mut PageEvent) -> Flow {
            self.log.borrow_mut().push(self.name);
            self.flow
        }
    }

    fn recorder(
        name: &'static str,
        interests: EventKind,
        flow: Flow,
        log: &Rc<RefCell<Vec<&'static str>>>,
    ) -> Recorder {
        Recorder {
            name,
            interests,
            flow,
            log: Rc::clone(log),
        }
    }

    fn run(bus: &mut Dispatcher, event: PageEvent) -> DispatchOutcome {
        let mut doc = MemoryDocument::new();
        let config = ControllerConfig::default();
        let mut cx = Context::new(&mut doc, &config, Capabilities::modern());
        let mut event = event;
        bus.dispatch(&mut cx, &mut event)
    }

    #[test]
    fn fan_out_follows_registration_and_interest() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = Dispatcher::new();
        bus.subscribe(recorder("a", EventKind::SUBMIT, Flow::Continue, &log))
            .subscribe(recorder("b", EventKind::KEY_DOWN, Flow::Continue, &log))
            .subscribe(recorder("c", EventKind::all(), Flow::Continue, &log));

        let outcome = run(
            &mut bus,
            PageEvent::Submit {
                form: NodeId::from_raw(1),
                submitter: None,
            },
        );
        assert_eq!(*log.borrow(), vec!["a", "c"]);
        assert_eq!(outcome.delivered_to, vec!["a", "c"]);
        assert!(!outcome.default_prevented);
    }

    #[test]
    fn cancel_stops_fan_out_and_prevents_default() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = Dispatcher::new();
        bus.subscribe(recorder("guard", EventKind::SUBMIT, Flow::Cancel, &log))
            .subscribe(recorder("loading", EventKind::SUBMIT, Flow::Continue, &log));

        let outcome = run(
            &mut bus,
            PageEvent::Submit {
                form: NodeId::from_raw(1),
                submitter: None,
            },
        );
        assert_eq!(*log.borrow(), vec!["guard"]);
        assert!(outcome.default_prevented);
        assert_eq!(outcome.cancelled_by, Some("guard"));
    }

    #[test]
    fn prevent_default_does_not_stop_fan_out() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = Dispatcher::new();
        bus.subscribe(recorder("keys", EventKind::KEY_DOWN, Flow::PreventDefault, &log))
            .subscribe(recorder("other", EventKind::KEY_DOWN, Flow::Continue, &log));
        let outcome = run(
            &mut bus,
            PageEvent::KeyDown(hxui_core::KeyEvent::new(hxui_core::Key::Enter, None)),
        );
        assert_eq!(outcome.delivered_to, vec!["keys", "other"]);
        assert!(outcome.default_prevented);
        assert!(!outcome.is_cancelled());
    }

    #[test]
    fn trace_is_bounded_and_sequenced() {
        let mut bus = Dispatcher::new();
        for _ in 0..(TRACE_CAPACITY + 10) {
            run(&mut bus, PageEvent::DocumentReady);
        }
        assert_eq!(bus.trace().len(), TRACE_CAPACITY);
        assert_eq!(bus.trace().total(), (TRACE_CAPACITY + 10) as u64);
        let first = bus.trace().records().next().map(|r| r.seq);
        assert_eq!(first, Some(11));
        assert_eq!(bus.trace().last().map(|r| r.event), Some("document_ready"));
    }

    #[test]
    fn standard_order() {
        let bus = Dispatcher::standard();
        let names: Vec<_> = bus.subscriptions().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "request_authenticator",
                "submission_guard",
                "loading_state",
                "progress_renderer",
                "reveal",
                "swipe",
            ]
        );
    }

    #[test]
    fn cleared_trace_keeps_sequence() {
        let mut bus = Dispatcher::new();
        run(&mut bus, PageEvent::DocumentReady);
        run(&mut bus, PageEvent::DocumentReady);
        bus.trace_mut().clear();
        assert!(bus.trace().is_empty());
        assert_eq!(bus.trace().total(), 2);

        run(&mut bus, PageEvent::DocumentReady);
        assert_eq!(bus.trace().last().map(|r| r.seq), Some(3));
    }
}
