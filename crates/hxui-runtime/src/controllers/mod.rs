#![forbid(unsafe_code)]

//! The page controllers.
//!
//! | Controller | Events | Effect |
//! |------------|--------|--------|
//! | [`RequestAuthenticator`] | `ConfigRequest` | Anti-forgery header from cookie |
//! | [`SubmissionGuard`] | `Submit` | Confirmation prompt, may cancel |
//! | [`LoadingState`] | `Submit` | Disable + dim submit controls, loading label |
//! | [`ProgressRenderer`] | `DocumentReady`, `SubtreeReplaced` | Bar widths |
//! | [`RevealController`] | `DocumentReady`, `SubtreeReplaced`, `Intersection` | Entrance reveal |
//! | [`SwipeController`] | `KeyDown`, `RequestStart`, `RequestEnd` | Shortcuts, in-flight indicator |
//!
//! Every controller is a pure function of (event, document, config,
//! capabilities): none of them keeps element handles between events.

pub mod csrf;
pub mod loading;
pub mod progress;
pub mod reveal;
pub mod submit_guard;
pub mod swipe;

pub use csrf::RequestAuthenticator;
pub use loading::{LoadingPhase, LoadingState};
pub use progress::ProgressRenderer;
pub use reveal::{RevealController, RevealState};
pub use submit_guard::SubmissionGuard;
pub use swipe::{IndicatorState, SwipeAction, SwipeController};

/// Attribute value, with empty strings treated as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
