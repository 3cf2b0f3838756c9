#![forbid(unsafe_code)]

//! Event wiring between the browser and the runtime.
//!
//! | Browser event | Target | Page event |
//! |---------------|--------|------------|
//! | `submit` (capture) | document | `Submit` |
//! | `keydown` | document | `KeyDown` |
//! | `htmx:configRequest` | body | `ConfigRequest` |
//! | `htmx:beforeRequest` | body | `RequestStart` |
//! | `htmx:afterRequest` | body | `RequestEnd` |
//! | `htmx:afterSwap` | body | `SubtreeReplaced` |
//! | `DOMContentLoaded` | document | `DocumentReady` |
//! | observer callback | shared `IntersectionObserver` | `Intersection` |
//!
//! # Re-entrancy
//!
//! `requestSubmit()` fires the `submit` listener synchronously. Submissions
//! requested by controllers are therefore queued on the document and only
//! performed once the runtime borrow is released. A listener that still
//! finds the runtime borrowed drops its event with a warning.

use std::cell::RefCell;
use std::rc::Rc;

use hxui_core::event::{IntersectionEntry, Modifiers};
use hxui_core::{
    Capabilities, ControllerConfig, Document, Key, KeyEvent, PageEvent, RequestHeaders, SubmitMode,
};
use hxui_runtime::{DispatchOutcome, Runtime};
use js_sys::{Array, Object, Reflect};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, SubmitEvent,
};

use crate::document::WebDocument;
use crate::error::WebError;
use crate::probe::{ProbeReport, probe};

type Shared = Rc<RefCell<Runtime<WebDocument>>>;
type Listener = Closure<dyn FnMut(Event)>;

/// Live installation: the runtime plus every callback the browser holds.
struct Installation {
    runtime: Shared,
    _listeners: Vec<Listener>,
    _observer_callback: Option<Closure<dyn FnMut(Array, IntersectionObserver)>>,
}

thread_local! {
    static INSTALLED: RefCell<Option<Installation>> = const { RefCell::new(None) };
}

/// Whether controllers are installed on this page.
pub fn is_installed() -> bool {
    INSTALLED.with(|slot| slot.borrow().is_some())
}

/// Build the page event inside the runtime borrow, dispatch it, then
/// perform any queued submissions.
fn dispatch_with(
    shared: &Shared,
    build: impl FnOnce(&WebDocument) -> Option<PageEvent>,
    finish: impl FnOnce(&mut PageEvent, &DispatchOutcome),
) -> Option<DispatchOutcome> {
    let (outcome, submits) = {
        let Ok(mut rt) = shared.try_borrow_mut() else {
            warn!("runtime busy; event dropped");
            return None;
        };
        let mut event = build(rt.document())?;
        let outcome = rt.dispatch(&mut event);
        finish(&mut event, &outcome);
        (outcome, rt.document_mut().take_submissions())
    };
    for (form, mode) in submits {
        let result = match mode {
            SubmitMode::RequestSubmit => form.request_submit(),
            SubmitMode::Raw => form.submit(),
        };
        if let Err(err) = result {
            warn!(?mode, error = ?err, "form submission failed");
        }
    }
    Some(outcome)
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    capture: bool,
    handler: impl FnMut(Event) + 'static,
) -> Result<Listener, WebError> {
    let callback = Listener::wrap(Box::new(handler));
    target
        .add_event_listener_with_callback_and_bool(event, callback.as_ref().unchecked_ref(), capture)
        .map_err(|err| WebError::Listener {
            event,
            reason: format!("{err:?}"),
        })?;
    Ok(callback)
}

fn event_detail(event: &Event) -> JsValue {
    Reflect::get(event, &JsValue::from_str("detail")).unwrap_or(JsValue::UNDEFINED)
}

fn read_headers(detail: &JsValue) -> (JsValue, RequestHeaders) {
    let object = Reflect::get(detail, &JsValue::from_str("headers")).unwrap_or(JsValue::UNDEFINED);
    let mut headers = RequestHeaders::new();
    if let Some(obj) = object.dyn_ref::<Object>() {
        for pair in Object::entries(obj).iter() {
            let pair = Array::from(&pair);
            if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                headers.set(&name, value);
            }
        }
    }
    (object, headers)
}

fn write_headers(object: &JsValue, headers: &RequestHeaders) {
    if !object.is_object() {
        return;
    }
    for (name, value) in headers.iter() {
        if let Err(err) = Reflect::set(object, &JsValue::from_str(name), &JsValue::from_str(value))
        {
            warn!(header = name, error = ?err, "header write failed");
        }
    }
}

fn key_event(doc: &WebDocument, event: &KeyboardEvent) -> KeyEvent {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, event.shift_key());
    modifiers.set(Modifiers::CTRL, event.ctrl_key());
    modifiers.set(Modifiers::ALT, event.alt_key());
    modifiers.set(Modifiers::META, event.meta_key());
    KeyEvent::new(Key::from_dom(&event.key()), doc.target_id(event.target()))
        .with_modifiers(modifiers)
}

fn observer_options(config: &ControllerConfig) -> IntersectionObserverInit {
    let options = config.reveal.observe_options();
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(f64::from(options.threshold)));
    init.set_root_margin(&options.root_margin.to_css());
    init
}

/// Install the page controllers.
///
/// # Errors
///
/// Fails when the page has no window, document or body, when controllers
/// are already installed, or when a listener cannot be attached.
pub fn install(config: ControllerConfig, capabilities: Capabilities) -> Result<(), WebError> {
    if is_installed() {
        return Err(WebError::AlreadyInstalled);
    }
    let window = web_sys::window().ok_or(WebError::NoWindow)?;
    let document = window.document().ok_or(WebError::NoDocument)?;
    let body = document.body().ok_or(WebError::NoBody)?;

    let options = observer_options(&config);
    let runtime = Runtime::with_config(
        WebDocument::new(window, document.clone()),
        config,
        capabilities,
    )?;
    let shared: Shared = Rc::new(RefCell::new(runtime));

    let observer_callback = if capabilities.can_observe() {
        let rt = Rc::clone(&shared);
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::wrap(Box::new(
            move |entries: Array, _observer: IntersectionObserver| {
                dispatch_with(
                    &rt,
                    |doc| {
                        let entries = entries
                            .iter()
                            .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                            .map(|e| IntersectionEntry {
                                target: doc.node_id(&e.target()),
                                is_intersecting: e.is_intersecting(),
                            })
                            .collect();
                        Some(PageEvent::Intersection(entries))
                    },
                    |_, _| {},
                );
            },
        ));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(|err| WebError::Observer(format!("{err:?}")))?;
        shared.borrow_mut().document_mut().set_observer(observer);
        Some(callback)
    } else {
        None
    };

    let mut listeners = Vec::new();
    let doc_target: &EventTarget = document.as_ref();
    let body_target: &EventTarget = body.as_ref();

    let rt = Rc::clone(&shared);
    listeners.push(listen(doc_target, "submit", true, move |event: Event| {
        let submitter = event
            .dyn_ref::<SubmitEvent>()
            .and_then(SubmitEvent::submitter);
        dispatch_with(
            &rt,
            |doc| {
                let form = doc.target_id(event.target())?;
                let submitter = submitter.map(|s| doc.node_id(s.as_ref()));
                Some(PageEvent::Submit { form, submitter })
            },
            |_, outcome| {
                if outcome.default_prevented {
                    event.prevent_default();
                }
            },
        );
    })?);

    let rt = Rc::clone(&shared);
    listeners.push(listen(doc_target, "keydown", false, move |event: Event| {
        let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        dispatch_with(
            &rt,
            |doc| Some(PageEvent::KeyDown(key_event(doc, keyboard))),
            |_, outcome| {
                if outcome.default_prevented {
                    event.prevent_default();
                }
            },
        );
    })?);

    let rt = Rc::clone(&shared);
    listeners.push(listen(body_target, "htmx:configRequest", false, move |event: Event| {
        let (object, headers) = read_headers(&event_detail(&event));
        dispatch_with(
            &rt,
            |doc| {
                let target = doc.target_id(event.target())?;
                Some(PageEvent::ConfigRequest { target, headers })
            },
            |event, _| {
                if let PageEvent::ConfigRequest { headers, .. } = event {
                    write_headers(&object, headers);
                }
            },
        );
    })?);

    let rt = Rc::clone(&shared);
    listeners.push(listen(body_target, "htmx:beforeRequest", false, move |event: Event| {
        dispatch_with(
            &rt,
            |doc| {
                let target = doc.target_id(event.target())?;
                Some(PageEvent::RequestStart { target })
            },
            |_, _| {},
        );
    })?);

    let rt = Rc::clone(&shared);
    listeners.push(listen(body_target, "htmx:afterRequest", false, move |event: Event| {
        let successful = Reflect::get(&event_detail(&event), &JsValue::from_str("successful"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        dispatch_with(
            &rt,
            |doc| {
                let target = doc.target_id(event.target())?;
                Some(PageEvent::RequestEnd { target, successful })
            },
            |_, _| {},
        );
    })?);

    let rt = Rc::clone(&shared);
    listeners.push(listen(body_target, "htmx:afterSwap", false, move |event: Event| {
        dispatch_with(
            &rt,
            |doc| {
                let pruned = doc.prune();
                if pruned > 0 {
                    debug!(pruned, "stale node handles dropped");
                }
                let root = doc.target_id(event.target())?;
                Some(PageEvent::SubtreeReplaced { root })
            },
            |_, _| {},
        );
    })?);

    let rt = Rc::clone(&shared);
    listeners.push(listen(doc_target, "DOMContentLoaded", false, move |_event: Event| {
        dispatch_with(&rt, |_| Some(PageEvent::DocumentReady), |_, _| {});
    })?);

    let booted = dispatch_with(
        &shared,
        |doc| doc.ready_state().is_ready().then_some(PageEvent::DocumentReady),
        |_, _| {},
    )
    .is_some();
    info!(?capabilities, booted, "hxui controllers installed");

    INSTALLED.with(|slot| {
        *slot.borrow_mut() = Some(Installation {
            runtime: shared,
            _listeners: listeners,
            _observer_callback: observer_callback,
        });
    });
    Ok(())
}

/// Number of dispatches recorded since install, if installed.
pub fn dispatch_count() -> Option<u64> {
    INSTALLED.with(|slot| {
        let slot = slot.borrow();
        let installation = slot.as_ref()?;
        let rt = installation.runtime.try_borrow().ok()?;
        Some(rt.dispatcher().trace().total())
    })
}

/// JS entry point: `install(configJson?)`.
///
/// Capabilities are probed from the live browser.
#[wasm_bindgen(js_name = install)]
pub fn install_js(config_json: Option<String>) -> Result<(), JsValue> {
    let config = crate::load_config(config_json.as_deref()).map_err(to_js)?;
    let window = web_sys::window().ok_or(WebError::NoWindow).map_err(to_js)?;
    let report: ProbeReport = probe(&window);
    install(config, report.capabilities()).map_err(to_js)
}

fn to_js(err: WebError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
