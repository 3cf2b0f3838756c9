#![forbid(unsafe_code)]

//! Confirmation prompts for form submission.
//!
//! Submissions are intercepted document-wide, so forms inserted by later
//! swaps are covered without per-form registration. The message is
//! resolved from the submitting control first, then the form; empty
//! attributes count as absent. A declined prompt returns [`Flow::Cancel`],
//! which suppresses the native submission and keeps the loading-state
//! controller from ever seeing the event.

use hxui_core::{Document, EventKind, NodeId, PageEvent};
use tracing::debug;

use super::non_empty;
use crate::controller::{Context, Controller, Flow};

/// Resolve the confirmation message for a submission.
#[must_use]
pub fn confirmation_message(
    doc: &dyn Document,
    form: NodeId,
    submitter: Option<NodeId>,
    attribute: &str,
) -> Option<String> {
    submitter
        .and_then(|s| non_empty(doc.attribute(s, attribute)))
        .or_else(|| non_empty(doc.attribute(form, attribute)))
}

/// Whether `node` is a form element.
pub(crate) fn is_form(doc: &dyn Document, node: NodeId) -> bool {
    doc.tag_name(node).as_deref() == Some("form")
}

/// Asks the user to confirm submissions that declare a message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionGuard;

impl Controller for SubmissionGuard {
    fn name(&self) -> &'static str {
        "submission_guard"
    }

    fn interests(&self) -> EventKind {
        EventKind::SUBMIT
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut PageEvent) -> Flow {
        let PageEvent::Submit { form, submitter } = *event else {
            return Flow::Continue;
        };
        if !is_form(&*cx.doc, form) {
            return Flow::Continue;
        }
        let Some(message) =
            confirmation_message(&*cx.doc, form, submitter, &cx.config.attributes.confirm)
        else {
            return Flow::Continue;
        };
        if cx.doc.confirm(&message) {
            Flow::Continue
        } else {
            debug!(%form, "submission declined at confirmation");
            Flow::Cancel
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxui_core::memory::{El, MemoryDocument};
    use hxui_core::{Capabilities, ControllerConfig};

    fn page(form_msg: Option<&str>, button_msg: Option<&str>) -> (MemoryDocument, NodeId, NodeId) {
        let mut button = El::new("button").attr("type", "submit").text("Delete");
        if let Some(msg) = button_msg {
            button = button.attr("data-confirm", msg);
        }
        let mut form = El::new("form").child(button);
        if let Some(msg) = form_msg {
            form = form.attr("data-confirm", msg);
        }
        let mut doc = MemoryDocument::new();
        let form = doc.append(NodeId::ROOT, form);
        let button = doc
            .query_first(form, &hxui_core::selector::submit_controls())
            .expect("button");
        (doc, form, button)
    }

    fn submit(doc: &mut MemoryDocument, form: NodeId, submitter: Option<NodeId>) -> Flow {
        let config = ControllerConfig::default();
        let mut cx = Context::new(doc, &config, Capabilities::modern());
        let mut event = PageEvent::Submit { form, submitter };
        SubmissionGuard.handle(&mut cx, &mut event)
    }

    #[test]
    fn submitter_message_takes_precedence() {
        let (doc, form, button) = page(Some("form?"), Some("button?"));
        assert_eq!(
            confirmation_message(&doc, form, Some(button), "data-confirm").as_deref(),
            Some("button?")
        );
        assert_eq!(
            confirmation_message(&doc, form, None, "data-confirm").as_deref(),
            Some("form?")
        );
    }

    #[test]
    fn empty_submitter_message_falls_back_to_form() {
        let (doc, form, button) = page(Some("form?"), Some(""));
        assert_eq!(
            confirmation_message(&doc, form, Some(button), "data-confirm").as_deref(),
            Some("form?")
        );
    }

    #[test]
    fn no_message_submits_without_prompt() {
        let (mut doc, form, button) = page(None, None);
        assert_eq!(submit(&mut doc, form, Some(button)), Flow::Continue);
        assert!(doc.confirmations().is_empty());
    }

    #[test]
    fn declined_prompt_cancels() {
        let (mut doc, form, button) = page(None, Some("Really delete?"));
        doc.queue_confirm(false);
        assert_eq!(submit(&mut doc, form, Some(button)), Flow::Cancel);
        assert_eq!(doc.confirmations(), &["Really delete?"]);
    }

    #[test]
    fn accepted_prompt_continues() {
        let (mut doc, form, _) = page(Some("Sure?"), None);
        doc.queue_confirm(true);
        assert_eq!(submit(&mut doc, form, None), Flow::Continue);
        assert_eq!(doc.confirmations(), &["Sure?"]);
    }

    #[test]
    fn non_form_targets_are_ignored() {
        let (mut doc, _, button) = page(None, Some("never shown"));
        doc.queue_confirm(false);
        assert_eq!(submit(&mut doc, button, Some(button)), Flow::Continue);
        assert!(doc.confirmations().is_empty());
    }
}
