#![forbid(unsafe_code)]

//! Runtime capability and preference probe.
//!
//! Controllers never test for browser APIs inline. A [`Capabilities`] value
//! is computed once by the host (see `hxui_web::probe`) and injected into
//! the runtime, so tests can exercise every branch deterministically.
//!
//! # Degradation
//!
//! | Missing | Effect |
//! |---------|--------|
//! | `INTERSECTION_OBSERVER` | Reveal targets are shown immediately |
//! | `REQUEST_SUBMIT` | Keyboard shortcuts fall back to a raw submit |
//!
//! `REDUCED_MOTION` is a user preference rather than an API; when set,
//! reveal animation is skipped entirely.

use bitflags::bitflags;

use crate::dom::SubmitMode;

bitflags! {
    /// Detected platform capabilities and user preferences.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// `prefers-reduced-motion: reduce` matched.
        const REDUCED_MOTION = 0b0001;
        /// Visibility observation is available.
        const INTERSECTION_OBSERVER = 0b0010;
        /// Forms support validating `requestSubmit`.
        const REQUEST_SUBMIT = 0b0100;
    }
}

impl Capabilities {
    /// Current evergreen browser, no motion preference.
    #[must_use]
    pub const fn modern() -> Self {
        Self::INTERSECTION_OBSERVER.union(Self::REQUEST_SUBMIT)
    }

    /// Old runtime without observation or `requestSubmit`.
    #[must_use]
    pub const fn legacy() -> Self {
        Self::empty()
    }

    #[must_use]
    pub const fn with_reduced_motion(self, reduced: bool) -> Self {
        if reduced {
            self.union(Self::REDUCED_MOTION)
        } else {
            self.difference(Self::REDUCED_MOTION)
        }
    }

    #[must_use]
    pub const fn prefers_reduced_motion(self) -> bool {
        self.contains(Self::REDUCED_MOTION)
    }

    #[must_use]
    pub const fn can_observe(self) -> bool {
        self.contains(Self::INTERSECTION_OBSERVER)
    }

    /// Preferred programmatic submission mechanism.
    #[must_use]
    pub const fn submit_mode(self) -> SubmitMode {
        if self.contains(Self::REQUEST_SUBMIT) {
            SubmitMode::RequestSubmit
        } else {
            SubmitMode::Raw
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::modern()
    }
}
