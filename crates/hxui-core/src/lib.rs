#![forbid(unsafe_code)]

//! Document adapter, typed page events, and capability probing for hxui.
//!
//! Controllers in `hxui-runtime` only ever see a [`Document`] and
//! [`PageEvent`]s; browser specifics live in `hxui-web`, and
//! [`memory::MemoryDocument`] stands in for the browser in tests.

pub mod capability;
pub mod config;
pub mod cookie;
pub mod dom;
pub mod event;
pub mod memory;
pub mod selector;

pub use capability::Capabilities;
pub use config::{ConfigError, ControllerConfig};
pub use dom::{Document, NodeId, ObserveOptions, ReadyState, SubmitMode};
pub use event::{EventKind, Key, KeyEvent, PageEvent, RequestHeaders};
