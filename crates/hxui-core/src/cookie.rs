#![forbid(unsafe_code)]

//! Cookie string reading.
//!
//! # Invariants
//!
//! 1. The cookie string is re-read on every call; nothing is cached.
//! 2. Pairs are separated by `;` and trimmed; the first pair whose text
//!    starts with `name=` wins.
//! 3. Values are percent-decoded. `+` is kept literally.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing cookie | Name not present | `None` |
//! | Malformed escape | `%zz`, trailing `%` | Escape kept literally |
//! | Invalid UTF-8 after decoding | `%ff` | `None` |

/// Read the value of cookie `name` from a raw `document.cookie` string.
///
/// An empty value (`name=`) is returned as `Some("")`; callers decide
/// whether an empty token is meaningful.
///
/// ```
/// use hxui_core::cookie::read_cookie;
///
/// let jar = "theme=dark;  csrftoken=abc%3D%3D; lang=en";
/// assert_eq!(read_cookie(jar, "csrftoken").as_deref(), Some("abc=="));
/// assert_eq!(read_cookie(jar, "missing"), None);
/// ```
#[must_use]
pub fn read_cookie(cookie_string: &str, name: &str) -> Option<String> {
    if cookie_string.is_empty() || name.is_empty() {
        return None;
    }
    let raw = cookie_string.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
    })?;
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(cookie = name, error = %_err, "cookie value is not valid UTF-8");
            None
        }
    }
}
