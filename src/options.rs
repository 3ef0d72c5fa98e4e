//! Configuration options for JSON++ stringification.
//!
//! This module provides types to customize the rendered text:
//!
//! - [`Options`]: Main configuration struct
//! - [`Indent`]: Indentation unit (empty means compact output)
//! - [`ForceMultiline`]: Per-kind switches that force multi-line layout
//! - [`Key`]: What the visibility filter is asked about
//!
//! ## Examples
//!
//! ```rust
//! use serde_jsonpp::{parse, stringify_with_options, Key, Options};
//!
//! let doc = parse("{\"foo\":\"bar\",\"baz\":1}").unwrap();
//!
//! // Two-space indentation
//! let text = stringify_with_options(&doc, &Options::pretty());
//! assert_eq!(text, "{ \"foo\": \"bar\", \"baz\": 1 }");
//!
//! // Hide a key
//! let options = Options::new().with_filter(|key, _, _| key != Key::Name("baz"));
//! assert_eq!(stringify_with_options(&doc, &options), "{\"foo\":\"bar\"}");
//! ```

use crate::{Path, Value};
use std::fmt;
use std::sync::Arc;

const MAX_INDENT: usize = 10;

/// The indentation unit repeated once per nesting level.
///
/// An empty unit selects compact output.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::Indent;
///
/// assert_eq!(Indent::spaces(4).as_str(), "    ");
/// assert_eq!(Indent::spaces(40).as_str().len(), 10);
/// assert!(Indent::spaces(0).is_compact());
/// assert_eq!(Indent::custom("\t").as_str(), "\t");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Indent(String);

impl Indent {
    /// `n` spaces, clamped to 10.
    #[must_use]
    pub fn spaces(n: usize) -> Self {
        Indent(" ".repeat(n.min(MAX_INDENT)))
    }

    /// An arbitrary unit, truncated to its first 10 characters.
    #[must_use]
    pub fn custom(unit: &str) -> Self {
        Indent(unit.chars().take(MAX_INDENT).collect())
    }

    #[must_use]
    pub fn compact() -> Self {
        Indent(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_compact(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<usize> for Indent {
    fn from(n: usize) -> Self {
        Indent::spaces(n)
    }
}

impl From<&str> for Indent {
    fn from(unit: &str) -> Self {
        Indent::custom(unit)
    }
}

/// Forces multi-line layout per composite kind, regardless of width.
///
/// Has no effect on compact output. `tagged` follows `mapping` when unset.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::ForceMultiline;
///
/// let all = ForceMultiline::from(true);
/// assert!(all.sequence && all.mapping && all.callable);
/// assert!(all.tagged());
///
/// let maps = ForceMultiline { mapping: true, ..Default::default() };
/// assert!(maps.tagged());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ForceMultiline {
    pub sequence: bool,
    pub mapping: bool,
    pub tagged: Option<bool>,
    pub callable: bool,
}

impl ForceMultiline {
    /// The effective flag for tagged values.
    #[must_use]
    pub fn tagged(&self) -> bool {
        self.tagged.unwrap_or(self.mapping)
    }
}

impl From<bool> for ForceMultiline {
    fn from(all: bool) -> Self {
        ForceMultiline {
            sequence: all,
            mapping: all,
            tagged: Some(all),
            callable: all,
        }
    }
}

/// The member a visibility filter is asked about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key<'a> {
    /// Position of a sequence element (or typed-collection element) in its
    /// source sequence
    Index(usize),
    /// Mapping key, declared member name or own field name
    Name(&'a str),
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "[{i}]"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

/// Visibility predicate: receives the member's key, its value and the path it
/// would be emitted at. Members for which it returns `false` are omitted.
pub type Filter = Arc<dyn Fn(Key<'_>, &Value, &Path) -> bool + Send + Sync>;

/// Configuration options for JSON++ stringification.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::{Indent, Options};
///
/// // Default compact options
/// let options = Options::new();
/// assert!(options.indent.is_compact());
///
/// // Pretty-printed with 2-space indentation
/// let options = Options::pretty();
/// assert_eq!(options.indent, Indent::spaces(2));
///
/// // Custom configuration
/// let options = Options::new()
///     .with_indent(4)
///     .with_multiline(true)
///     .with_line_ending("\r\n");
/// ```
#[derive(Clone)]
pub struct Options {
    pub indent: Indent,
    pub multiline: ForceMultiline,
    /// Emit a tagged value's own fields
    pub own_data: bool,
    /// Emit a tagged value's declared members
    pub declared_members: bool,
    pub line_ending: String,
    filter: Option<Filter>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: Indent::compact(),
            multiline: ForceMultiline::default(),
            own_data: true,
            declared_members: true,
            line_ending: "\n".to_string(),
            filter: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("indent", &self.indent)
            .field("multiline", &self.multiline)
            .field("own_data", &self.own_data)
            .field("declared_members", &self.declared_members)
            .field("line_ending", &self.line_ending)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Options {
    /// Creates default options (compact, every member visible).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for indented output with a 2-space unit.
    #[must_use]
    pub fn pretty() -> Self {
        Options {
            indent: Indent::spaces(2),
            ..Default::default()
        }
    }

    /// Sets the indentation: a number of spaces or a custom unit string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_jsonpp::{Indent, Options};
    ///
    /// assert_eq!(Options::new().with_indent(4).indent, Indent::spaces(4));
    /// assert_eq!(Options::new().with_indent("\t").indent, Indent::custom("\t"));
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<Indent>) -> Self {
        self.indent = indent.into();
        self
    }

    #[must_use]
    pub fn with_multiline(mut self, multiline: impl Into<ForceMultiline>) -> Self {
        self.multiline = multiline.into();
        self
    }

    #[must_use]
    pub fn with_own_data(mut self, own_data: bool) -> Self {
        self.own_data = own_data;
        self
    }

    #[must_use]
    pub fn with_declared_members(mut self, declared_members: bool) -> Self {
        self.declared_members = declared_members;
        self
    }

    /// Sets the line terminator used by multi-line layout.
    #[must_use]
    pub fn with_line_ending(mut self, line_ending: &str) -> Self {
        self.line_ending = line_ending.to_string();
        self
    }

    /// Installs a visibility filter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_jsonpp::{parse, stringify_with_options, Key, Options};
    ///
    /// let doc = parse("[\"a\",\"b\",\"c\"]").unwrap();
    /// let options = Options::new().with_filter(|key, _, _| key != Key::Index(1));
    /// assert_eq!(stringify_with_options(&doc, &options), "[\"a\",\"c\"]");
    /// ```
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(Key<'_>, &Value, &Path) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Asks the filter whether a member is emitted.
    #[must_use]
    pub fn includes(&self, key: Key<'_>, value: &Value, path: &Path) -> bool {
        self.filter.as_ref().map_or(true, |f| f(key, value, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.indent.is_compact());
        assert!(options.own_data);
        assert!(options.declared_members);
        assert_eq!(options.line_ending, "\n");
        assert!(options.includes(Key::Index(0), &Value::Null, &Path::root()));
    }

    #[test]
    fn test_custom_indent_truncates() {
        let indent = Indent::custom("-+-+-+-+-+-+");
        assert_eq!(indent.as_str(), "-+-+-+-+-+");
        assert!(Indent::custom("").is_compact());
    }

    #[test]
    fn test_tagged_multiline_follows_mapping() {
        let unset = ForceMultiline {
            mapping: true,
            ..Default::default()
        };
        assert!(unset.tagged());

        let explicit = ForceMultiline {
            mapping: true,
            tagged: Some(false),
            ..Default::default()
        };
        assert!(!explicit.tagged());
    }

    #[test]
    fn test_filter_sees_path() {
        let options = Options::new().with_filter(|_, _, path| !path.is_root());
        assert!(!options.includes(Key::Name("a"), &Value::Null, &Path::root()));
        assert!(options.includes(Key::Name("a"), &Value::Null, &Path::root().key("a")));
    }

    #[test]
    fn test_debug_hides_closure() {
        let options = Options::new().with_filter(|_, _, _| true);
        assert!(format!("{options:?}").contains("<fn>"));
    }
}
