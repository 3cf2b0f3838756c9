#![forbid(unsafe_code)]

//! Browser binding for hxui.
//!
//! On `wasm32` this crate provides:
//! - `WebDocument`, the [`Document`](hxui_core::Document) adapter over the
//!   live DOM
//! - `install`, which probes the browser, wires page and htmx events to a
//!   [`Runtime`](hxui_runtime::Runtime), and keeps the listeners alive
//! - the `install(configJson?)` JS entry point
//!
//! Configuration parsing, the probe report, and [`WebError`] compile on
//! every target so they can be tested natively.

pub mod error;
pub mod probe;

#[cfg(target_arch = "wasm32")]
pub mod document;
#[cfg(target_arch = "wasm32")]
pub mod install;

pub use error::WebError;
pub use probe::ProbeReport;

#[cfg(target_arch = "wasm32")]
pub use document::WebDocument;
#[cfg(target_arch = "wasm32")]
pub use install::{dispatch_count, install, is_installed};

use hxui_core::ControllerConfig;

/// Resolve the configuration passed from JS.
///
/// `None` or a blank string selects the defaults; anything else must be a
/// (possibly partial) JSON object.
///
/// # Errors
///
/// [`WebError::Config`] when the JSON is malformed or fails validation.
pub fn load_config(json: Option<&str>) -> Result<ControllerConfig, WebError> {
    match json.map(str::trim) {
        None | Some("") => Ok(ControllerConfig::default()),
        Some(text) => Ok(ControllerConfig::from_json_str(text)?),
    }
}
