#![forbid(unsafe_code)]

//! hxui public facade.
//!
//! Re-exports the document adapter and event types from `hxui-core`, the
//! controllers and runtime from `hxui-runtime` (feature `runtime`), and
//! the browser binding from `hxui-web` (feature `web`).
//!
//! ```
//! use hxui::prelude::*;
//! use hxui::memory::{El, MemoryDocument};
//!
//! let mut doc = MemoryDocument::new();
//! let meter = doc.append(
//!     NodeId::ROOT,
//!     El::new("div")
//!         .attr("data-progress", "64")
//!         .child(El::new("div").attr("data-progress-bar", "")),
//! );
//! let mut runtime = Runtime::new(doc, Capabilities::modern());
//! runtime.start();
//!
//! let bar = runtime
//!     .document()
//!     .query_first(meter, &Selector::attr("data-progress-bar").into())
//!     .unwrap();
//! assert_eq!(runtime.document().style(bar, "width"), Some("64%"));
//! ```

pub use hxui_core::{
    Capabilities, ConfigError, ControllerConfig, Document, EventKind, Key, KeyEvent, NodeId,
    ObserveOptions, PageEvent, ReadyState, RequestHeaders, SubmitMode,
};
pub use hxui_core::{capability, config, cookie, dom, event, memory, selector};

#[cfg(feature = "runtime")]
pub use hxui_runtime::{
    BootState, Context, Controller, DispatchOutcome, DispatchTrace, Dispatcher, Flow, Runtime,
    controllers,
};

#[cfg(feature = "web")]
pub use hxui_web as web;

/// Commonly used types.
pub mod prelude {
    pub use hxui_core::selector::{Selector, SelectorList};
    pub use hxui_core::{
        Capabilities, ControllerConfig, Document, EventKind, NodeId, PageEvent, RequestHeaders,
    };

    #[cfg(feature = "runtime")]
    pub use hxui_runtime::{Context, Controller, Dispatcher, Flow, Runtime};
}
