#![forbid(unsafe_code)]

//! Minimal typed selectors.
//!
//! The controllers only ever need compound selectors of the shape
//! `tag#id[attr][attr="v"][attr$="suffix"]` and comma-separated unions of
//! them. Modelling that subset as data (instead of passing CSS strings
//! around) lets the in-memory document evaluate selectors without a CSS
//! engine, while browser adapters render the same value with
//! [`SelectorList::to_css`].
//!
//! # Example
//!
//! ```
//! use hxui_core::selector::Selector;
//!
//! let sel = Selector::tag("form").with_attr_eq("data-swipe", "like");
//! assert_eq!(sel.to_css(), r#"form[data-swipe="like"]"#);
//! ```

use core::fmt;

/// Comparison applied to one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    /// `[name]`
    Exists,
    /// `[name="value"]`
    Equals(String),
    /// `[name$="suffix"]`; an empty suffix never matches, as in CSS.
    EndsWith(String),
}

/// One attribute predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: String,
    pub op: AttrOp,
}

impl AttrMatch {
    fn matches(&self, value: Option<&str>) -> bool {
        match (&self.op, value) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(expected), Some(v)) => v == expected,
            (AttrOp::EndsWith(suffix), Some(v)) => {
                !suffix.is_empty() && v.ends_with(suffix.as_str())
            }
        }
    }
}

/// A compound selector: every present part must match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    attrs: Vec<AttrMatch>,
}

impl Selector {
    /// Match any element.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Match elements by tag name (case-insensitive).
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    /// Match the element with the given id.
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    /// Match elements carrying the attribute.
    #[must_use]
    pub fn attr(name: &str) -> Self {
        Self::any().with_attr(name)
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str) -> Self {
        self.attrs.push(AttrMatch {
            name: name.to_string(),
            op: AttrOp::Exists,
        });
        self
    }

    #[must_use]
    pub fn with_attr_eq(mut self, name: &str, value: &str) -> Self {
        self.attrs.push(AttrMatch {
            name: name.to_string(),
            op: AttrOp::Equals(value.to_string()),
        });
        self
    }

    #[must_use]
    pub fn with_attr_suffix(mut self, name: &str, suffix: &str) -> Self {
        self.attrs.push(AttrMatch {
            name: name.to_string(),
            op: AttrOp::EndsWith(suffix.to_string()),
        });
        self
    }

    /// Evaluate against an element described by its tag and an attribute
    /// lookup. The id part is checked through the `id` attribute.
    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.tag
            && !tag.eq_ignore_ascii_case(expected)
        {
            return false;
        }
        if let Some(expected) = &self.id
            && attr("id") != Some(expected.as_str())
        {
            return false;
        }
        self.attrs.iter().all(|m| m.matches(attr(m.name.as_str())))
    }

    /// Render as a CSS compound selector.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        if let Some(tag) = &self.tag {
            out.push_str(tag);
        }
        if let Some(id) = &self.id {
            out.push('#');
            push_escaped_ident(&mut out, id);
        }
        for m in &self.attrs {
            out.push('[');
            out.push_str(&m.name);
            match &m.op {
                AttrOp::Exists => {}
                AttrOp::Equals(v) => {
                    out.push('=');
                    push_quoted(&mut out, v);
                }
                AttrOp::EndsWith(v) => {
                    out.push_str("$=");
                    push_quoted(&mut out, v);
                }
            }
            out.push(']');
        }
        if out.is_empty() {
            out.push('*');
        }
        out
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Union of selectors (`a, b`). An element matches if any member matches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    #[must_use]
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self(selectors)
    }

    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }

    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str> + Copy) -> bool {
        self.0.iter().any(|s| s.matches(tag, attr))
    }

    /// Render as a CSS selector list. An empty list renders as `:not(*)`.
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.0.is_empty() {
            return ":not(*)".to_string();
        }
        self.0
            .iter()
            .map(Selector::to_css)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Selector> for SelectorList {
    fn from(selector: Selector) -> Self {
        Self(vec![selector])
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Submit controls of a form: `button[type="submit"], input[type="submit"]`.
#[must_use]
pub fn submit_controls() -> SelectorList {
    SelectorList::new(vec![
        Selector::tag("button").with_attr_eq("type", "submit"),
        Selector::tag("input").with_attr_eq("type", "submit"),
    ])
}

fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn push_escaped_ident(out: &mut String, ident: &str) {
    for (i, ch) in ident.chars().enumerate() {
        let plain = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii();
        if plain && !(i == 0 && ch.is_ascii_digit()) {
            out.push(ch);
        } else if plain {
            out.push_str(&format!("\\{:x} ", ch as u32));
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
}
