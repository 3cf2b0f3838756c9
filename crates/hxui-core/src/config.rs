#![forbid(unsafe_code)]

//! Controller configuration.
//!
//! Every attribute, class, cookie and header name a controller reads lives
//! here, with defaults matching the server-rendered markup. Hosts that
//! render different markup override individual names; with the
//! `policy-config` feature, partial TOML or JSON documents are layered over
//! the defaults.
//!
//! ```
//! use hxui_core::config::ControllerConfig;
//!
//! let config = ControllerConfig::default();
//! assert_eq!(config.csrf.header_name, "X-CSRFToken");
//! assert!(config.validate().is_ok());
//! ```

use crate::dom::{ObserveOptions, RootMargin};

#[cfg(feature = "policy-config")]
use serde::Deserialize;

/// Errors from configuration loading and validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required name was empty.
    EmptyName(&'static str),
    /// The reveal threshold was outside `[0, 1]` or not finite.
    InvalidThreshold(f32),
    /// The reveal root margin was outside `[-100, 100]` or not finite.
    InvalidMargin(f32),
    /// A config document could not be parsed.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName(field) => write!(f, "config field '{field}' must not be empty"),
            Self::InvalidThreshold(t) => write!(f, "reveal threshold {t} is outside [0, 1]"),
            Self::InvalidMargin(m) => write!(f, "reveal margin {m}% is outside [-100, 100]"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Anti-forgery token transport.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Deserialize), serde(default))]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrftoken".to_string(),
            header_name: "X-CSRFToken".to_string(),
        }
    }
}

/// Declarative markup attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Deserialize), serde(default))]
pub struct AttributeNames {
    pub confirm: String,
    pub loading_text: String,
    pub original_text: String,
    pub original_value: String,
    pub progress: String,
    pub progress_bar: String,
    pub reveal: String,
    pub swipe: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            confirm: "data-confirm".to_string(),
            loading_text: "data-loading-text".to_string(),
            original_text: "data-original-text".to_string(),
            original_value: "data-original-value".to_string(),
            progress: "data-progress".to_string(),
            progress_bar: "data-progress-bar".to_string(),
            reveal: "data-reveal".to_string(),
            swipe: "data-swipe".to_string(),
        }
    }
}

/// CSS classes toggled by controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Deserialize), serde(default))]
pub struct ClassNames {
    pub dimmed: String,
    pub hidden: String,
    pub reveal_pending: String,
    pub reveal_shown: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            dimmed: "opacity-60".to_string(),
            hidden: "hidden".to_string(),
            reveal_pending: "reveal-init".to_string(),
            reveal_shown: "reveal-show".to_string(),
        }
    }
}

/// Swipe form addressing and in-flight indicator location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Deserialize), serde(default))]
pub struct SwipeConfig {
    pub pass_action: String,
    pub like_action: String,
    pub undo_action_suffix: String,
    pub indicator_container_id: String,
    pub indicator_id: String,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            pass_action: "pass".to_string(),
            like_action: "like".to_string(),
            undo_action_suffix: "/swipe/undo/".to_string(),
            indicator_container_id: "card".to_string(),
            indicator_id: "swipe-indicator".to_string(),
        }
    }
}

/// Reveal observation tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Deserialize), serde(default))]
pub struct RevealConfig {
    /// Visible fraction that triggers the reveal.
    pub threshold: f32,
    /// Bottom viewport margin in percent; negative shrinks the viewport.
    pub bottom_margin_percent: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.12,
            bottom_margin_percent: -10.0,
        }
    }
}

impl RevealConfig {
    #[must_use]
    pub fn observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            threshold: self.threshold,
            root_margin: RootMargin::bottom(self.bottom_margin_percent),
        }
    }
}

/// All controller configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "policy-config", derive(Deserialize), serde(default))]
pub struct ControllerConfig {
    pub csrf: CsrfConfig,
    pub attributes: AttributeNames,
    pub classes: ClassNames,
    pub swipe: SwipeConfig,
    pub reveal: RevealConfig,
}

impl ControllerConfig {
    /// Check names are non-empty and reveal tuning is in range.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names: [(&'static str, &String); 19] = [
            ("csrf.cookie_name", &self.csrf.cookie_name),
            ("csrf.header_name", &self.csrf.header_name),
            ("attributes.confirm", &self.attributes.confirm),
            ("attributes.loading_text", &self.attributes.loading_text),
            ("attributes.original_text", &self.attributes.original_text),
            ("attributes.original_value", &self.attributes.original_value),
            ("attributes.progress", &self.attributes.progress),
            ("attributes.progress_bar", &self.attributes.progress_bar),
            ("attributes.reveal", &self.attributes.reveal),
            ("attributes.swipe", &self.attributes.swipe),
            ("classes.dimmed", &self.classes.dimmed),
            ("classes.hidden", &self.classes.hidden),
            ("classes.reveal_pending", &self.classes.reveal_pending),
            ("classes.reveal_shown", &self.classes.reveal_shown),
            ("swipe.pass_action", &self.swipe.pass_action),
            ("swipe.like_action", &self.swipe.like_action),
            ("swipe.undo_action_suffix", &self.swipe.undo_action_suffix),
            (
                "swipe.indicator_container_id",
                &self.swipe.indicator_container_id,
            ),
            ("swipe.indicator_id", &self.swipe.indicator_id),
        ];
        if let Some((field, _)) = names.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::EmptyName(*field));
        }
        let t = self.reveal.threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        let m = self.reveal.bottom_margin_percent;
        if !m.is_finite() || !(-100.0..=100.0).contains(&m) {
            return Err(ConfigError::InvalidMargin(m));
        }
        Ok(())
    }

    /// Load a partial TOML document over the defaults and validate it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed input, or any validation error.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a partial JSON document over the defaults and validate it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed input, or any validation error.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
