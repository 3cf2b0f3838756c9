#![forbid(unsafe_code)]

//! The controller contract.
//!
//! A controller is a small, independent reaction to one or more
//! [`PageEvent`] kinds. It holds no element handles between events: every
//! lookup goes through the [`Context`] it is handed at dispatch time, so a
//! controller keeps working after any subtree of the page is replaced.

use hxui_core::{Capabilities, ControllerConfig, Document, EventKind, PageEvent};

/// Everything a controller may touch while handling one event.
pub struct Context<'a> {
    pub doc: &'a mut dyn Document,
    pub config: &'a ControllerConfig,
    pub capabilities: Capabilities,
}

impl<'a> Context<'a> {
    pub fn new(
        doc: &'a mut dyn Document,
        config: &'a ControllerConfig,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            doc,
            config,
            capabilities,
        }
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// What a controller asks the dispatcher to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Keep fanning out; leave browser default handling alone.
    #[default]
    Continue,
    /// Keep fanning out; suppress the browser default.
    PreventDefault,
    /// Suppress the browser default and stop fan-out.
    Cancel,
}

impl Flow {
    #[must_use]
    pub const fn prevents_default(self) -> bool {
        matches!(self, Self::PreventDefault | Self::Cancel)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::PreventDefault => "prevent_default",
            Self::Cancel => "cancel",
        }
    }
}

/// A page controller.
pub trait Controller {
    /// Stable name used in traces and logs.
    fn name(&self) -> &'static str;

    /// Event kinds this controller subscribes to.
    fn interests(&self) -> EventKind;

    /// React to `event`. Only called for kinds in [`interests`](Self::interests).
    fn handle(&mut self, cx: &mut Context<'_>, event: &mut PageEvent) -> Flow;
}
