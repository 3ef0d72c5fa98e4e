//! Bracket- and quote-aware splitting.
//!
//! JSON++ is parsed top-down by cutting a span into pieces at delimiters that
//! sit outside every quoted string and at bracket depth zero. The helpers here
//! are shared by the value parser, type-tag detection and the callable codec.
//!
//! ```rust
//! use serde_jsonpp::split::split_on_level;
//!
//! assert_eq!(
//!     split_on_level("a,{b,c},\"d,e\"", ","),
//!     vec!["a", "{b,c}", "\"d,e\""]
//! );
//! ```

/// Returns the closing bracket for an opening one.
#[inline]
#[must_use]
pub const fn closer_of(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        _ => None,
    }
}

#[inline]
fn is_bracket(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'[' | b']' | b'{' | b'}')
}

#[inline]
fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

/// Running bracket nesting state.
///
/// Once a closer fails to match, the history can never become balanced
/// again, which is exactly what re-checking the whole history would report.
#[derive(Debug, Default, Clone)]
pub struct Nesting {
    stack: Vec<u8>,
    broken: bool,
}

impl Nesting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one bracket character. Non-bracket bytes are ignored.
    pub fn push(&mut self, b: u8) {
        if self.broken {
            return;
        }
        if closer_of(b).is_some() {
            self.stack.push(b);
        } else if is_bracket(b) {
            match self.stack.pop() {
                Some(open) if closer_of(open) == Some(b) => {}
                _ => self.broken = true,
            }
        }
    }

    /// `true` when every bracket seen so far is closed in matching order.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        !self.broken && self.stack.is_empty()
    }

    /// Current open depth, or `None` once the history is malformed.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        if self.broken {
            None
        } else {
            Some(self.stack.len())
        }
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.broken = false;
    }
}

/// Checks whether a sequence of bracket characters is validly nested.
///
/// ```rust
/// use serde_jsonpp::split::is_balanced;
///
/// assert!(is_balanced(b"([]{})"));
/// assert!(!is_balanced(b"(]"));
/// assert!(!is_balanced(b"(("));
/// ```
#[must_use]
pub fn is_balanced(brackets: &[u8]) -> bool {
    let mut nesting = Nesting::new();
    for &b in brackets {
        nesting.push(b);
    }
    nesting.is_balanced()
}

/// Returns `true` if the byte at `index` is preceded by an odd number of
/// consecutive backslashes.
#[must_use]
pub fn is_escaped(text: &str, index: usize) -> bool {
    text.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// Tracks whether the scanner is inside a quoted string.
#[derive(Debug, Default, Clone, Copy)]
struct Quoting {
    open: Option<u8>,
}

impl Quoting {
    /// Feeds the byte at `index`; returns `true` if it is string content or a
    /// quote delimiter, i.e. not structural.
    fn feed(&mut self, text: &str, index: usize, b: u8) -> bool {
        match self.open {
            Some(q) => {
                if b == q && !is_escaped(text, index) {
                    self.open = None;
                }
                true
            }
            None if is_quote(b) && !is_escaped(text, index) => {
                self.open = Some(b);
                true
            }
            None => false,
        }
    }
}

/// Extracts the structural bracket characters of `text`, skipping anything
/// inside quoted strings.
#[must_use]
pub fn brackets(text: &str) -> Vec<u8> {
    let mut quoting = Quoting::default();
    text.bytes()
        .enumerate()
        .filter(|&(i, b)| !quoting.feed(text, i, b) && is_bracket(b))
        .map(|(_, b)| b)
        .collect()
}

/// Splits `text` on `delimiter` wherever the delimiter sits outside quoted
/// strings and the brackets seen since the previous cut are balanced.
///
/// Always returns at least one span.
#[must_use]
pub fn split_on_level<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let Some(&first) = delimiter.as_bytes().first() else {
        return vec![text];
    };

    let mut parts = Vec::new();
    let mut nesting = Nesting::new();
    let mut quoting = Quoting::default();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if quoting.feed(text, i, b) {
            i += 1;
            continue;
        }
        if is_bracket(b) {
            nesting.push(b);
        } else if b == first
            && text.is_char_boundary(i)
            && text[i..].starts_with(delimiter)
            && nesting.is_balanced()
        {
            parts.push(&text[start..i]);
            nesting.reset();
            i += delimiter.len();
            start = i;
            continue;
        }
        i += 1;
    }

    parts.push(&text[start..]);
    parts
}

/// Finds the index of the bracket closing the one opened at `open_at`.
///
/// Quoted content is skipped. Returns `None` if the bracket at `open_at` is
/// not an opener or is never closed, or if a mismatched closer is hit first.
#[must_use]
pub fn matching_close(text: &str, open_at: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    closer_of(*bytes.get(open_at)?)?;

    let mut nesting = Nesting::new();
    let mut quoting = Quoting::default();
    for (i, &b) in bytes.iter().enumerate().skip(open_at) {
        if quoting.feed(text, i, b) || !is_bracket(b) {
            continue;
        }
        nesting.push(b);
        match nesting.depth() {
            Some(0) => return Some(i),
            None => return None,
            Some(_) => {}
        }
    }
    None
}

/// Finds the first structural (unquoted) occurrence of any byte in `targets`.
#[must_use]
pub fn find_unquoted(text: &str, targets: &[u8]) -> Option<usize> {
    let mut quoting = Quoting::default();
    text.bytes()
        .enumerate()
        .find(|&(i, b)| !quoting.feed(text, i, b) && targets.contains(&b))
        .map(|(i, _)| i)
}

/// Returns `true` if `text` opens with `open` and its matching closer is the
/// final byte.
#[must_use]
pub fn is_enclosed(text: &str, open: u8) -> bool {
    text.as_bytes().first() == Some(&open) && matching_close(text, 0) == Some(text.len() - 1)
}
