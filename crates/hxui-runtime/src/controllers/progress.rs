#![forbid(unsafe_code)]

//! Progress bar painting.
//!
//! Elements declaring a percentage get the width of their nested bar set
//! to that percentage. Rendering runs at document ready over the whole
//! document and after each swap over the swapped subtree only. Attribute
//! changes outside those two triggers are not observed.

use hxui_core::selector::{Selector, SelectorList};
use hxui_core::{ControllerConfig, Document, EventKind, NodeId, PageEvent};
use tracing::trace;

use crate::controller::{Context, Controller, Flow};

/// Parse a declared percentage the way `parseInt(raw || "0", 10)` does,
/// then clamp to `[0, 100]`. Anything without a leading integer is 0.
///
/// ```
/// use hxui_runtime::controllers::progress::parse_percent;
///
/// assert_eq!(parse_percent(Some("42")), 42);
/// assert_eq!(parse_percent(Some("150")), 100);
/// assert_eq!(parse_percent(Some("-5")), 0);
/// assert_eq!(parse_percent(Some("abc")), 0);
/// assert_eq!(parse_percent(Some(" 12.9%")), 12);
/// assert_eq!(parse_percent(None), 0);
/// ```
#[must_use]
pub fn parse_percent(raw: Option<&str>) -> u8 {
    let raw = raw.unwrap_or_default().trim_start_matches(is_script_whitespace);
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut value: u64 = 0;
    let mut any = false;
    for d in digits {
        any = true;
        value = value.saturating_mul(10).saturating_add(u64::from(d - b'0'));
    }
    if !any || negative {
        return 0;
    }
    value.min(100) as u8
}

/// Whitespace and line terminators skipped before an integer prefix.
///
/// Unicode `White_Space` minus U+0085, plus U+FEFF.
fn is_script_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c != '\u{85}' && c.is_whitespace())
}

/// Paint every progress element under `scope`. Returns the number of bars
/// painted; elements without a nested bar are skipped.
pub fn render_progress(
    doc: &mut dyn Document,
    config: &ControllerConfig,
    scope: NodeId,
) -> usize {
    let attrs = &config.attributes;
    let bar_selector: SelectorList = Selector::attr(&attrs.progress_bar).into();
    let mut painted = 0;
    for el in doc.query_all(scope, &Selector::attr(&attrs.progress).into()) {
        let percent = parse_percent(doc.attribute(el, &attrs.progress).as_deref());
        let Some(bar) = doc.query_first(el, &bar_selector) else {
            continue;
        };
        doc.set_style(bar, "width", &format!("{percent}%"));
        painted += 1;
    }
    painted
}

/// Paints progress bars at ready and after swaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressRenderer;

impl Controller for ProgressRenderer {
    fn name(&self) -> &'static str {
        "progress_renderer"
    }

    fn interests(&self) -> EventKind {
        EventKind::DOCUMENT_READY | EventKind::SUBTREE_REPLACED
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut PageEvent) -> Flow {
        let scope = match *event {
            PageEvent::DocumentReady => cx.doc.root(),
            PageEvent::SubtreeReplaced { root } => root,
            _ => return Flow::Continue,
        };
        let painted = render_progress(cx.doc, cx.config, scope);
        trace!(%scope, painted, "progress bars painted");
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxui_core::memory::{El, MemoryDocument};
    use proptest::prelude::*;

    fn progress(value: Option<&str>) -> El {
        El::new("div")
            .attr("data-progress", value.unwrap_or_default())
            .child(El::new("div").attr("data-progress-bar", ""))
    }

    fn bar_width(doc: &MemoryDocument, el: NodeId) -> Option<String> {
        let bar = doc.query_first(el, &Selector::attr("data-progress-bar").into())?;
        doc.style(bar, "width").map(str::to_string)
    }

    #[test]
    fn documented_examples() {
        for (raw, expected) in [("150", 100), ("-5", 0), ("abc", 0), ("42", 42)] {
            assert_eq!(parse_percent(Some(raw)), expected, "input {raw:?}");
        }
    }

    #[test]
    fn parse_int_prefix_rules() {
        assert_eq!(parse_percent(Some("")), 0);
        assert_eq!(parse_percent(Some("   7")), 7);
        assert_eq!(parse_percent(Some("+9")), 9);
        assert_eq!(parse_percent(Some("0x1A")), 0);
        assert_eq!(parse_percent(Some("1e3")), 1);
        assert_eq!(parse_percent(Some("-0")), 0);
        assert_eq!(parse_percent(Some("99999999999999999999999")), 100);
        assert_eq!(parse_percent(Some("- 5")), 0);
        assert_eq!(parse_percent(Some("NaN")), 0);
        assert_eq!(parse_percent(Some("Infinity")), 0);
        assert_eq!(parse_percent(Some("\u{FEFF}42")), 42);
        assert_eq!(parse_percent(Some("\u{a0}\u{2028}\t33")), 33);
        assert_eq!(parse_percent(Some("\u{85}5")), 0);
    }

    #[test]
    fn renders_whole_document_at_ready() {
        let mut doc = MemoryDocument::new();
        let a = doc.append(NodeId::ROOT, progress(Some("30")));
        let b = doc.append(NodeId::ROOT, progress(Some("250")));
        let c = doc.append(NodeId::ROOT, progress(None));
        let bare = doc.append(NodeId::ROOT, El::new("div").attr("data-progress", "50"));
        let config = ControllerConfig::default();

        assert_eq!(render_progress(&mut doc, &config, NodeId::ROOT), 3);
        assert_eq!(bar_width(&doc, a).as_deref(), Some("30%"));
        assert_eq!(bar_width(&doc, b).as_deref(), Some("100%"));
        assert_eq!(bar_width(&doc, c).as_deref(), Some("0%"));
        assert_eq!(bar_width(&doc, bare), None);
    }

    #[test]
    fn swap_rerenders_only_the_swapped_subtree() {
        let mut doc = MemoryDocument::new();
        let outside = doc.append(NodeId::ROOT, progress(Some("10")));
        let target = doc.append(NodeId::ROOT, El::new("section"));
        let config = ControllerConfig::default();
        let mut renderer = ProgressRenderer;

        {
            let mut cx = Context::new(&mut doc, &config, hxui_core::Capabilities::modern());
            renderer.handle(&mut cx, &mut PageEvent::DocumentReady);
        }
        assert_eq!(bar_width(&doc, outside).as_deref(), Some("10%"));

        doc.set_attribute(outside, "data-progress", "90");
        let fresh = doc.replace_children(target, vec![progress(Some("64"))]);
        {
            let mut cx = Context::new(&mut doc, &config, hxui_core::Capabilities::modern());
            renderer.handle(&mut cx, &mut PageEvent::SubtreeReplaced { root: target });
        }
        assert_eq!(bar_width(&doc, fresh[0]).as_deref(), Some("64%"));
        assert_eq!(bar_width(&doc, outside).as_deref(), Some("10%"));
    }

    proptest! {
        #[test]
        fn integers_are_clamped(p in any::<i64>()) {
            let expected = p.clamp(0, 100) as u8;
            prop_assert_eq!(parse_percent(Some(&p.to_string())), expected);
        }

        #[test]
        fn never_exceeds_one_hundred(raw in ".*") {
            prop_assert!(parse_percent(Some(&raw)) <= 100);
        }
    }
}
