#![forbid(unsafe_code)]

//! Loading state for submitting forms.
//!
//! Once a submission survives the guard, every submit control in that
//! form is disabled and dimmed. One control (the submitter, else the first
//! submit control in document order) has its label replaced by the loading
//! text when the control or its form declares one.
//!
//! # Invariants
//!
//! 1. Disabling covers all submit controls of the form, not only the
//!    submitter.
//! 2. The original label is captured once: a repeated submission never
//!    overwrites the saved label with the loading text.
//! 3. There is no restore path. The page is expected to navigate or swap
//!    the form out after the request.

use hxui_core::selector::submit_controls;
use hxui_core::{ControllerConfig, Document, EventKind, NodeId, PageEvent};
use tracing::debug;

use super::non_empty;
use super::submit_guard::is_form;
use crate::controller::{Context, Controller, Flow};

/// Loading phase of one submit control, derived from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadingPhase {
    /// Enabled and not dimmed.
    Idle,
    /// Disabled and dimmed.
    Engaged,
    /// Engaged, with the original label saved and replaced.
    Labelled,
}

impl LoadingPhase {
    #[must_use]
    pub fn of(doc: &dyn Document, config: &ControllerConfig, control: NodeId) -> Self {
        let engaged = doc.is_disabled(control) && doc.has_class(control, &config.classes.dimmed);
        if !engaged {
            return Self::Idle;
        }
        let attrs = &config.attributes;
        let saved = doc.attribute(control, &attrs.original_text).is_some()
            || doc.attribute(control, &attrs.original_value).is_some();
        if saved { Self::Labelled } else { Self::Engaged }
    }
}

/// Disable the form's submit controls and apply the loading label.
///
/// Returns the control whose label was replaced, if any.
pub fn engage(
    doc: &mut dyn Document,
    config: &ControllerConfig,
    form: NodeId,
    submitter: Option<NodeId>,
) -> Option<NodeId> {
    let controls = doc.query_all(form, &submit_controls());
    for &control in &controls {
        doc.set_disabled(control, true);
        doc.add_class(control, &config.classes.dimmed);
    }

    let control = submitter.or_else(|| controls.first().copied())?;
    let attrs = &config.attributes;
    let loading_text = non_empty(doc.attribute(control, &attrs.loading_text))
        .or_else(|| non_empty(doc.attribute(form, &attrs.loading_text)))?;

    if doc.tag_name(control).as_deref() == Some("button") {
        if doc.attribute(control, &attrs.original_text).is_none() {
            let original = doc.text_content(control);
            doc.set_attribute(control, &attrs.original_text, &original);
        }
        doc.set_text_content(control, &loading_text);
    } else {
        if doc.attribute(control, &attrs.original_value).is_none() {
            let original = doc.value(control);
            doc.set_attribute(control, &attrs.original_value, &original);
        }
        doc.set_value(control, &loading_text);
    }
    Some(control)
}

/// Applies loading feedback to submissions that were not cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadingState;

impl Controller for LoadingState {
    fn name(&self) -> &'static str {
        "loading_state"
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
        let labelled = engage(cx.doc, cx.config, form, submitter);
        debug!(%form, labelled = ?labelled, "loading state engaged");
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxui_core::memory::{El, MemoryDocument};
    use hxui_core::selector::Selector;
    use pretty_assertions::assert_eq;

    struct Page {
        doc: MemoryDocument,
        form: NodeId,
        save: NodeId,
        publish: NodeId,
        plain: NodeId,
    }

    fn page(form_loading: Option<&str>) -> Page {
        let mut form = El::new("form").children([
            El::new("input").attr("type", "text").attr("name", "title"),
            El::new("button")
                .attr("type", "submit")
                .attr("name", "save")
                .text("Save"),
            El::new("input")
                .attr("type", "submit")
                .attr("name", "publish")
                .attr("value", "Publish")
                .attr("data-loading-text", "Publishing…"),
            El::new("button").attr("type", "button").attr("name", "plain").text("Preview"),
        ]);
        if let Some(text) = form_loading {
            form = form.attr("data-loading-text", text);
        }
        let mut doc = MemoryDocument::new();
        let form = doc.append(NodeId::ROOT, form);
        let by_name = |doc: &MemoryDocument, name: &str| {
            doc.query_first(form, &Selector::attr("name").with_attr_eq("name", name).into())
                .expect("control")
        };
        let save = by_name(&doc, "save");
        let publish = by_name(&doc, "publish");
        let plain = by_name(&doc, "plain");
        Page {
            doc,
            form,
            save,
            publish,
            plain,
        }
    }

    #[test]
    fn all_submit_controls_are_disabled_and_dimmed() {
        let mut p = page(None);
        let config = ControllerConfig::default();
        engage(&mut p.doc, &config, p.form, Some(p.save));
        for control in [p.save, p.publish] {
            assert!(p.doc.is_disabled(control));
            assert!(p.doc.has_class(control, "opacity-60"));
        }
        assert!(!p.doc.is_disabled(p.plain));
        assert!(!p.doc.has_class(p.plain, "opacity-60"));
    }

    #[test]
    fn without_loading_text_labels_are_untouched() {
        let mut p = page(None);
        let config = ControllerConfig::default();
        assert_eq!(engage(&mut p.doc, &config, p.form, Some(p.save)), None);
        assert_eq!(p.doc.text_content(p.save), "Save");
        assert_eq!(LoadingPhase::of(&p.doc, &config, p.save), LoadingPhase::Engaged);
    }

    #[test]
    fn button_label_uses_form_loading_text() {
        let mut p = page(Some("Saving…"));
        let config = ControllerConfig::default();
        assert_eq!(engage(&mut p.doc, &config, p.form, Some(p.save)), Some(p.save));
        assert_eq!(p.doc.text_content(p.save), "Saving…");
        assert_eq!(
            p.doc.attribute(p.save, "data-original-text").as_deref(),
            Some("Save")
        );
        assert_eq!(LoadingPhase::of(&p.doc, &config, p.save), LoadingPhase::Labelled);
    }

    #[test]
    fn input_label_prefers_control_loading_text() {
        let mut p = page(Some("Saving…"));
        let config = ControllerConfig::default();
        engage(&mut p.doc, &config, p.form, Some(p.publish));
        assert_eq!(p.doc.value(p.publish), "Publishing…");
        assert_eq!(
            p.doc.attribute(p.publish, "data-original-value").as_deref(),
            Some("Publish")
        );
        assert_eq!(p.doc.text_content(p.save), "Save");
    }

    #[test]
    fn without_submitter_first_submit_control_is_labelled() {
        let mut p = page(Some("Working…"));
        let config = ControllerConfig::default();
        assert_eq!(engage(&mut p.doc, &config, p.form, None), Some(p.save));
        assert_eq!(p.doc.text_content(p.save), "Working…");
    }

    #[test]
    fn original_label_is_saved_once() {
        let mut p = page(Some("Saving…"));
        let config = ControllerConfig::default();
        engage(&mut p.doc, &config, p.form, Some(p.save));
        engage(&mut p.doc, &config, p.form, Some(p.save));
        assert_eq!(
            p.doc.attribute(p.save, "data-original-text").as_deref(),
            Some("Save")
        );
        assert_eq!(p.doc.text_content(p.save), "Saving…");
    }

    #[test]
    fn form_without_submit_controls_is_a_no_op() {
        let mut doc = MemoryDocument::new();
        let form = doc.append(NodeId::ROOT, El::new("form").attr("data-loading-text", "x"));
        let config = ControllerConfig::default();
        assert_eq!(engage(&mut doc, &config, form, None), None);
    }
}
