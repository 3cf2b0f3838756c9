//! JSON Lines export of the dispatch trace.

use hxui_core::memory::{El, MemoryDocument};
use hxui_core::{Capabilities, Key, KeyEvent, NodeId, PageEvent};
use hxui_runtime::Runtime;
use pretty_assertions::assert_eq;
use serde_json::Value;

#[test]
fn every_dispatch_becomes_one_json_line() {
    let mut doc = MemoryDocument::new();
    let form = doc.append(
        NodeId::ROOT,
        El::new("form")
            .attr("data-confirm", "Sure?")
            .child(El::new("button").attr("type", "submit")),
    );
    doc.queue_confirm(false);
    let mut rt = Runtime::new(doc, Capabilities::modern());
    rt.start();
    rt.dispatch(&mut PageEvent::Submit {
        form,
        submitter: None,
    });
    rt.dispatch(&mut PageEvent::KeyDown(KeyEvent::new(Key::ArrowLeft, None)));

    let jsonl = rt.dispatcher().trace().to_jsonl();
    let lines: Vec<Value> = jsonl
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json"))
        .collect();
    assert_eq!(lines.len(), 3);

    let events: Vec<&str> = lines
        .iter()
        .map(|l| l["event"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(events, vec!["document_ready", "submit", "key_down"]);

    let submit = &lines[1];
    assert_eq!(submit["seq"], 2);
    assert_eq!(submit["default_prevented"], true);
    assert_eq!(
        submit["deliveries"],
        serde_json::json!([{ "controller": "submission_guard", "flow": "cancel" }])
    );

    let key = &lines[2];
    assert_eq!(
        key["deliveries"],
        serde_json::json!([{ "controller": "swipe", "flow": "prevent_default" }])
    );
}

#[test]
fn empty_trace_exports_nothing() {
    let rt = Runtime::new(MemoryDocument::new(), Capabilities::modern());
    assert_eq!(rt.dispatcher().trace().to_jsonl(), "");
}
