#![forbid(unsafe_code)]

//! Browser capability probe.
//!
//! Feature detection happens once, at install time. Each probe fails
//! closed for the API (a throwing lookup means "absent") and therefore
//! open for the user: missing observation shows content immediately.

use hxui_core::Capabilities;

/// Media query for the reduced-motion preference.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Raw probe answers, before folding into [`Capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeReport {
    pub reduced_motion: bool,
    pub intersection_observer: bool,
    pub request_submit: bool,
}

impl ProbeReport {
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::REDUCED_MOTION, self.reduced_motion);
        caps.set(Capabilities::INTERSECTION_OBSERVER, self.intersection_observer);
        caps.set(Capabilities::REQUEST_SUBMIT, self.request_submit);
        caps
    }
}

/// Probe the live browser.
#[cfg(target_arch = "wasm32")]
pub fn probe(window: &web_sys::Window) -> ProbeReport {
    use js_sys::Reflect;
    use wasm_bindgen::JsValue;

    let reduced_motion = window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .is_some_and(|mql| mql.matches());
    let intersection_observer =
        Reflect::has(window.as_ref(), &JsValue::from_str("IntersectionObserver")).unwrap_or(false);
    let request_submit = Reflect::get(window.as_ref(), &JsValue::from_str("HTMLFormElement"))
        .and_then(|ctor| Reflect::get(&ctor, &JsValue::from_str("prototype")))
        .and_then(|proto| Reflect::has(&proto, &JsValue::from_str("requestSubmit")))
        .unwrap_or(false);

    let report = ProbeReport {
        reduced_motion,
        intersection_observer,
        request_submit,
    };
    tracing::debug!(?report, "browser capabilities probed");
    report
}
