#![forbid(unsafe_code)]

//! Anti-forgery header injection.
//!
//! On every `ConfigRequest`, the token cookie is re-read and, when present
//! and non-empty, attached under the configured header name. A missing
//! cookie is not an error: the header is simply left alone.

use hxui_core::cookie::read_cookie;
use hxui_core::{ControllerConfig, Document, EventKind, PageEvent};
use tracing::trace;

use crate::controller::{Context, Controller, Flow};

/// Current anti-forgery token, if the cookie carries a non-empty one.
#[must_use]
pub fn anti_forgery_token(doc: &dyn Document, config: &ControllerConfig) -> Option<String> {
    read_cookie(&doc.cookie_string(), &config.csrf.cookie_name).filter(|t| !t.is_empty())
}

/// Attaches the anti-forgery token to outgoing requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestAuthenticator;

impl Controller for RequestAuthenticator {
    fn name(&self) -> &'static str {
        "request_authenticator"
    }

    fn interests(&self) -> EventKind {
        EventKind::CONFIG_REQUEST
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut PageEvent) -> Flow {
        let PageEvent::ConfigRequest { headers, .. } = event else {
            return Flow::Continue;
        };
        match anti_forgery_token(&*cx.doc, cx.config) {
            Some(token) => {
                headers.set(&cx.config.csrf.header_name, token);
                trace!(header = %cx.config.csrf.header_name, "anti-forgery header attached");
            }
            None => trace!(cookie = %cx.config.csrf.cookie_name, "no anti-forgery cookie"),
        }
        Flow::Continue
    }
}
