//! Node addresses and reference tokens.
//!
//! A path is written `/` followed by any number of segments, each either a
//! quoted mapping key (`"key"`) or a bracketed sequence index (`[2]`):
//!
//! ```text
//! /                 the root
//! /"qux"            member "qux" of the root mapping
//! /"qux"[2]"baz"    member "baz" of element 2 of member "qux"
//! ```
//!
//! The same text is used to name nodes while parsing and as the reference
//! token emitted for already-visited nodes while stringifying.

use crate::{Error, Result};
use std::fmt;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(&quote(key)),
            Segment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// A hierarchical node address, rooted at the document root.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::Path;
///
/// let path = Path::root().key("qux").index(2).key("baz");
/// assert_eq!(path.to_string(), "/\"qux\"[2]\"baz\"");
/// assert_eq!(Path::parse("/\"qux\"[2]\"baz\"").unwrap(), path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    #[must_use]
    pub fn root() -> Self {
        Path::default()
    }

    /// Returns the path of a mapping member under this path.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        self.child(Segment::Key(key.to_string()))
    }

    /// Returns the path of a sequence element under this path.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    #[must_use]
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Path { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parses a reference token.
    ///
    /// Keys may use either quote style; stray `/` separators between
    /// segments are tolerated. Whitespace between segments is ignored.
    ///
    /// # Errors
    ///
    /// Returns a structural error if the token does not start with `/`, a key
    /// is unterminated or an index is not a non-negative integer.
    pub fn parse(token: &str) -> Result<Self> {
        let text = token.trim();
        let Some(rest) = text.strip_prefix('/') else {
            return Err(Error::structural("path must start with `/`", token));
        };

        let bytes = rest.as_bytes();
        let mut segments = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'/' | b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                q @ (b'"' | b'\'') => {
                    let end = find_closing_quote(rest, i + 1, q)
                        .ok_or_else(|| Error::structural("unterminated path key", token))?;
                    segments.push(Segment::Key(unescape(&rest[i + 1..end])));
                    i = end + 1;
                }
                b'[' => {
                    let end = rest[i..]
                        .find(']')
                        .map(|offset| i + offset)
                        .ok_or_else(|| Error::structural("unterminated path index", token))?;
                    let index = rest[i + 1..end]
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| Error::structural("invalid path index", token))?;
                    segments.push(Segment::Index(index));
                    i = end + 1;
                }
                _ => return Err(Error::structural("invalid path segment", token)),
            }
        }
        Ok(Path { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

pub(crate) fn find_closing_quote(text: &str, from: usize, quote: u8) -> Option<usize> {
    text.as_bytes()
        .iter()
        .enumerate()
        .skip(from)
        .find(|&(i, &b)| b == quote && !crate::split::is_escaped(text, i))
        .map(|(i, _)| i)
}

/// Renders `s` as a double-quoted string literal with JSON++ escapes.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Resolves escape sequences in the inner text of a quoted literal.
///
/// Unknown escapes are preserved literally.
#[must_use]
pub fn unescape(inner: &str) -> String {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('/') => result.push('/'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{0008}'),
            Some('f') => result.push('\u{000C}'),
            Some('0') => result.push('\0'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        result.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => result.push_str("\\u"),
                }
            }
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}
