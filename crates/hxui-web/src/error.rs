#![forbid(unsafe_code)]

//! Installation errors.

use std::fmt;

use hxui_core::ConfigError;

/// Why the browser binding could not be installed.
#[derive(Debug, Clone, PartialEq)]
pub enum WebError {
    /// No global `window` (not running in a browser main thread).
    NoWindow,
    /// `window.document` is missing.
    NoDocument,
    /// `document.body` is missing; lifecycle listeners attach there.
    NoBody,
    /// Controllers are already installed on this page.
    AlreadyInstalled,
    /// The supplied configuration was rejected.
    Config(ConfigError),
    /// A listener could not be attached.
    Listener {
        event: &'static str,
        reason: String,
    },
    /// The shared visibility observer could not be created.
    Observer(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::NoBody => write!(f, "document has no body"),
            Self::AlreadyInstalled => write!(f, "page controllers already installed"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Listener { event, reason } => {
                write!(f, "failed to attach {event} listener: {reason}")
            }
            Self::Observer(reason) => write!(f, "failed to create intersection observer: {reason}"),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for WebError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
