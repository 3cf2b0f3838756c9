#![forbid(unsafe_code)]

//! Reveal-on-scroll.
//!
//! Each flagged element moves through a forward-only state machine:
//!
//! ```text
//! Uninitialized ──▶ Pending ──▶ Shown
//!        └──────────────────────▲
//! ```
//!
//! State lives in the element's classes, so it survives controller
//! restarts and is recovered from the document on every scan.
//!
//! # Invariants
//!
//! 1. `Shown` is terminal; no transition leaves it.
//! 2. An element is unobserved on its first intersecting report and is
//!    never observed again, since scans skip `Shown` elements.
//! 3. Under reduced motion, candidates go straight to `Shown` and any
//!    pending marker is removed.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | No observation capability | Every candidate is shown immediately |
//! | Non-intersecting report | Ignored; element stays pending |
//! | Report for a swapped-out element | Writes are no-ops on stale handles |

use hxui_core::event::IntersectionEntry;
use hxui_core::selector::Selector;
use hxui_core::{ControllerConfig, Document, EventKind, NodeId, PageEvent};
use tracing::debug;

use crate::controller::{Context, Controller, Flow};

/// Reveal state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RevealState {
    Uninitialized,
    Pending,
    Shown,
}

impl RevealState {
    /// Recover the state from the element's classes.
    #[must_use]
    pub fn of(doc: &dyn Document, config: &ControllerConfig, node: NodeId) -> Self {
        let classes = &config.classes;
        if doc.has_class(node, &classes.reveal_shown) {
            Self::Shown
        } else if doc.has_class(node, &classes.reveal_pending) {
            Self::Pending
        } else {
            Self::Uninitialized
        }
    }

    /// Whether moving to `next` is a forward transition.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }
}

/// Move `node` to `next` if that is a forward transition.
///
/// Returns whether the state changed.
pub fn advance(
    doc: &mut dyn Document,
    config: &ControllerConfig,
    node: NodeId,
    next: RevealState,
) -> bool {
    let current = RevealState::of(&*doc, config, node);
    if !current.can_advance_to(next) {
        return false;
    }
    let classes = &config.classes;
    match next {
        RevealState::Uninitialized => return false,
        RevealState::Pending => doc.add_class(node, &classes.reveal_pending),
        RevealState::Shown => doc.add_class(node, &classes.reveal_shown),
    }
    true
}

/// Counts from one scan, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevealScan {
    pub candidates: usize,
    pub shown: usize,
    pub observed: usize,
}

/// Initialize reveal targets under `scope`.
pub fn scan(cx: &mut Context<'_>, scope: NodeId) -> RevealScan {
    let config = cx.config;
    let candidates = cx
        .doc
        .query_all(scope, &Selector::attr(&config.attributes.reveal).into());
    let mut report = RevealScan {
        candidates: candidates.len(),
        ..RevealScan::default()
    };
    if candidates.is_empty() {
        return report;
    }

    if cx.capabilities.prefers_reduced_motion() {
        for &node in &candidates {
            cx.doc.remove_class(node, &config.classes.reveal_pending);
            if advance(cx.doc, config, node, RevealState::Shown) {
                report.shown += 1;
            }
        }
        return report;
    }

    for &node in &candidates {
        advance(cx.doc, config, node, RevealState::Pending);
    }

    if !cx.capabilities.can_observe() {
        for &node in &candidates {
            if advance(cx.doc, config, node, RevealState::Shown) {
                report.shown += 1;
            }
        }
        return report;
    }

    let options = config.reveal.observe_options();
    for &node in &candidates {
        if RevealState::of(&*cx.doc, config, node) == RevealState::Pending {
            cx.doc.observe(node, &options);
            report.observed += 1;
        }
    }
    report
}

/// Apply visibility reports. Returns how many elements were shown.
pub fn on_intersection(cx: &mut Context<'_>, entries: &[IntersectionEntry]) -> usize {
    let mut shown = 0;
    for entry in entries.iter().filter(|e| e.is_intersecting) {
        if advance(cx.doc, cx.config, entry.target, RevealState::Shown) {
            shown += 1;
        }
        cx.doc.unobserve(entry.target);
    }
    shown
}

/// Drives reveal targets through their state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevealController;

impl Controller for RevealController {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn interests(&self) -> EventKind {
        EventKind::DOCUMENT_READY | EventKind::SUBTREE_REPLACED | EventKind::INTERSECTION
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut PageEvent) -> Flow {
        match event {
            PageEvent::DocumentReady => {
                let root = cx.doc.root();
                let report = scan(cx, root);
                debug!(?report, "reveal targets initialized");
            }
            PageEvent::SubtreeReplaced { root } => {
                let report = scan(cx, *root);
                debug!(scope = %root, ?report, "reveal targets initialized");
            }
            PageEvent::Intersection(entries) => {
                let shown = on_intersection(cx, entries);
                if shown > 0 {
                    debug!(shown, "reveal targets shown");
                }
            }
            _ => {}
        }
        Flow::Continue
    }
}
