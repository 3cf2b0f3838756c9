#![no_main]

use arbitrary::Arbitrary;
use hxui_core::selector::Selector;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    tag: Option<&'a str>,
    attrs: Vec<(&'a str, Option<&'a str>, bool)>,
    probe: Vec<(&'a str, &'a str)>,
}

fuzz_target!(|input: Input<'_>| {
    let mut selector = match input.tag {
        Some(tag) => Selector::tag(tag),
        None => Selector::any(),
    };
    for (name, value, suffix) in &input.attrs {
        selector = match (value, suffix) {
            (None, _) => selector.with_attr(name),
            (Some(v), false) => selector.with_attr_eq(name, v),
            (Some(v), true) => selector.with_attr_suffix(name, v),
        };
    }
    let css = selector.to_css();
    assert!(!css.is_empty());
    let probe = &input.probe;
    let _ = selector.matches(input.tag.unwrap_or("div"), |name| {
        probe.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    });
});
