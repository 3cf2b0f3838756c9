#![forbid(unsafe_code)]

//! Page runtime: one document, one config, one dispatcher.
//!
//! The runtime owns the document adapter and hands controllers a fresh
//! [`Context`] for every event. Boot is a two-state machine:
//!
//! ```text
//! Waiting ──(ready signal)──▶ Booted
//! ```
//!
//! [`start`](Runtime::start) boots at once when the document has finished
//! parsing; otherwise boot happens on the first `DocumentReady` dispatched
//! afterwards. Ready signals arriving after boot are dropped, so ready-time
//! scans run exactly once per page load.

use hxui_core::{
    Capabilities, ConfigError, ControllerConfig, Document, NodeId, PageEvent, RequestHeaders,
};
use tracing::{debug, info};

use crate::controller::Context;
use crate::dispatcher::{DispatchOutcome, Dispatcher};

/// Boot progress of a [`Runtime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootState {
    /// Waiting for the document to finish parsing.
    #[default]
    Waiting,
    /// Ready-time controllers have run.
    Booted,
}

/// Controllers bound to one document.
#[derive(Debug)]
pub struct Runtime<D: Document> {
    doc: D,
    config: ControllerConfig,
    capabilities: Capabilities,
    dispatcher: Dispatcher,
    boot: BootState,
}

impl<D: Document> Runtime<D> {
    /// Runtime with default configuration and the standard controllers.
    pub fn new(doc: D, capabilities: Capabilities) -> Self {
        Self {
            doc,
            config: ControllerConfig::default(),
            capabilities,
            dispatcher: Dispatcher::standard(),
            boot: BootState::Waiting,
        }
    }

    /// Runtime with a validated custom configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by
    /// [`ControllerConfig::validate`].
    pub fn with_config(
        doc: D,
        config: ControllerConfig,
        capabilities: Capabilities,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut runtime = Self::new(doc, capabilities);
        runtime.config = config;
        Ok(runtime)
    }

    /// Replace the controller set.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Boot if the document is already parsed. Returns the boot state.
    pub fn start(&mut self) -> BootState {
        let ready = self.doc.ready_state();
        if ready.is_ready() {
            self.dispatch(&mut PageEvent::DocumentReady);
        } else {
            debug!(?ready, "document still loading; boot deferred");
        }
        self.boot
    }

    /// Dispatch one event to the controllers.
    ///
    /// A `DocumentReady` received after boot is not delivered.
    pub fn dispatch(&mut self, event: &mut PageEvent) -> DispatchOutcome {
        if matches!(event, PageEvent::DocumentReady) {
            if self.boot == BootState::Booted {
                debug!("duplicate ready signal ignored");
                return DispatchOutcome::default();
            }
            self.boot = BootState::Booted;
            info!(capabilities = ?self.capabilities, "page controllers booted");
        }
        let mut cx = Context::new(&mut self.doc, &self.config, self.capabilities);
        self.dispatcher.dispatch(&mut cx, event)
    }

    /// Run the configure-request hook and return the final headers.
    pub fn configure_request(&mut self, target: NodeId, headers: RequestHeaders) -> RequestHeaders {
        let mut event = PageEvent::ConfigRequest { target, headers };
        self.dispatch(&mut event);
        match event {
            PageEvent::ConfigRequest { headers, .. } => headers,
            _ => RequestHeaders::new(),
        }
    }

    #[must_use]
    pub fn boot_state(&self) -> BootState {
        self.boot
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Take the document back.
    pub fn into_document(self) -> D {
        self.doc
    }
}
