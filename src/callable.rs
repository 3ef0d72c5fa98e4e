//! Callable codec.
//!
//! A callable is stored as data: its parameter names and its body text in
//! canonical brace-delimited form. Nothing here evaluates code. Hosts that
//! want to run callables can hand [`Callable::params`] and [`Callable::body`]
//! to an evaluator of their choosing.
//!
//! Canonical rendering is `(p1, p2) => body`. A body that is a single
//! `return` statement renders as the bare expression, parenthesized when a
//! top-level `,`, `:` or `=>` in it would otherwise leak into the enclosing
//! value. Any other body renders as a re-indented block.
//!
//! ```rust
//! use serde_jsonpp::Callable;
//!
//! let inc = Callable::parse("(quux) => quux + 1").unwrap();
//! assert_eq!(inc.params(), ["quux"]);
//! assert_eq!(inc.body(), "{ return (quux + 1); }");
//! assert_eq!(inc.return_expression(), Some("quux + 1"));
//! assert_eq!(inc.to_string(), "(quux) => quux + 1");
//! ```

use crate::split::{brackets, closer_of, is_enclosed, matching_close, split_on_level};
use crate::{Error, Result};
use std::fmt;

/// The arrow token separating parameters from the body.
pub const ARROW: &str = "=>";

/// Parameter names plus canonical body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Callable {
    params: Vec<String>,
    body: String,
}

impl Callable {
    /// Creates a callable, wrapping an expression body as a single return.
    #[must_use]
    pub fn new<S: Into<String>>(params: Vec<S>, body: &str) -> Self {
        Callable {
            params: params.into_iter().map(Into::into).collect(),
            body: canonical_body(body),
        }
    }

    /// Parses `(params) => body`.
    ///
    /// # Errors
    ///
    /// Returns a lambda syntax error if the text does not split into exactly
    /// two parts on `=>`, the parameter side is not parenthesized, or the
    /// body is empty.
    pub fn parse(text: &str) -> Result<Self> {
        Self::try_parse(text)
            .unwrap_or_else(|| Err(Error::lambda_syntax("expected a single `=>`", text)))
    }

    /// Returns `None` when `text` is not an arrow split at all, so callers
    /// can try other value forms.
    pub(crate) fn try_parse(text: &str) -> Option<Result<Self>> {
        let parts = split_on_level(text, ARROW);
        if parts.len() != 2 {
            return None;
        }
        Some(Self::from_parts(parts[0].trim(), parts[1].trim(), text))
    }

    fn from_parts(left: &str, right: &str, text: &str) -> Result<Self> {
        if left.len() < 2 || !is_enclosed(left, b'(') {
            return Err(Error::lambda_syntax(
                "parameters must be a parenthesized list",
                text,
            ));
        }
        if right.is_empty() {
            return Err(Error::lambda_syntax("missing body", text));
        }
        Ok(Callable {
            params: parse_params(&left[1..left.len() - 1]),
            body: canonical_body(right),
        })
    }

    /// Normalizes heterogeneous callable source into canonical form.
    ///
    /// Besides the strict arrow form, accepts a bare single parameter
    /// (`x => x * 2`) and `function name(a, b) { ... }` declarations.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_jsonpp::Callable;
    ///
    /// let f = Callable::from_source("function add(left, right) { return left + right; }").unwrap();
    /// assert_eq!(f.to_string(), "(left, right) => left + right");
    ///
    /// let g = Callable::from_source("foo => foo").unwrap();
    /// assert_eq!(g.to_string(), "(foo) => foo");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a lambda syntax error if no supported shape matches.
    pub fn from_source(source: &str) -> Result<Self> {
        let text = source.trim();
        if let Some(rest) = text.strip_prefix("function") {
            return Self::from_function(rest, text);
        }

        let parts = split_on_level(text, ARROW);
        if parts.len() == 2 {
            let left = parts[0].trim();
            if is_identifier(left) {
                return Self::from_parts(&format!("({})", left), parts[1].trim(), text);
            }
        }
        Self::parse(text)
    }

    fn from_function(rest: &str, text: &str) -> Result<Self> {
        let open = rest
            .find('(')
            .ok_or_else(|| Error::lambda_syntax("missing parameter list", text))?;
        let name = rest[..open].trim();
        if !name.is_empty() && !is_identifier(name) {
            return Err(Error::lambda_syntax("invalid function name", text));
        }
        let close = matching_close(rest, open)
            .ok_or_else(|| Error::lambda_syntax("unbalanced parameter list", text))?;
        let body = rest[close + 1..].trim();
        if !is_enclosed(body, b'{') {
            return Err(Error::lambda_syntax("function body must be a block", text));
        }
        Ok(Callable {
            params: parse_params(&rest[open + 1..close]),
            body: body.to_string(),
        })
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The canonical brace-delimited body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// If the body is exactly one `return` statement, returns its expression
    /// with one redundant pair of wrapping parentheses removed.
    #[must_use]
    pub fn return_expression(&self) -> Option<&str> {
        let statements: Vec<&str> = split_on_level(self.inner(), ";")
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let [statement] = statements.as_slice() else {
            return None;
        };
        let rest = statement.strip_prefix("return")?;
        if !rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            return None;
        }
        let mut expr = rest.trim();
        if expr.len() >= 2 && is_enclosed(expr, b'(') {
            expr = expr[1..expr.len() - 1].trim();
        }
        // An object literal would read back as a block.
        if expr.is_empty() || expr.starts_with('{') {
            return None;
        }
        Some(expr)
    }

    fn inner(&self) -> &str {
        &self.body[1..self.body.len() - 1]
    }

    /// Non-empty trimmed source lines of the body.
    fn lines(&self) -> Vec<&str> {
        self.inner()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Statements of a single-line body, each re-terminated with `;`.
    fn statements(&self) -> Vec<String> {
        split_on_level(self.inner(), ";")
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.ends_with('}') {
                    s.to_string()
                } else {
                    format!("{};", s)
                }
            })
            .collect()
    }

    /// Renders the callable at nesting `level`.
    ///
    /// An empty `indent` renders blocks on one line. Otherwise a block body
    /// spans several lines when it already does or when `force_multiline`
    /// is set.
    pub(crate) fn render(
        &self,
        indent: &str,
        line_ending: &str,
        level: usize,
        force_multiline: bool,
    ) -> String {
        let head = format!("({}) => ", self.params.join(", "));
        if let Some(expr) = self.return_expression() {
            if stands_alone(expr) {
                return head + expr;
            }
            return format!("{}({})", head, expr);
        }

        let mut lines: Vec<String> = self.lines().into_iter().map(str::to_string).collect();
        if lines.is_empty() {
            return head + "{}";
        }
        if indent.is_empty() || (lines.len() == 1 && !force_multiline) {
            return format!("{}{{ {} }}", head, lines.join(" "));
        }
        if lines.len() == 1 {
            lines = self.statements();
        }

        let mut out = head;
        out.push('{');
        for (line, depth) in reindent(&lines) {
            out.push_str(line_ending);
            out.push_str(&indent.repeat(level + 1 + depth));
            out.push_str(line);
        }
        out.push_str(line_ending);
        out.push_str(&indent.repeat(level));
        out.push('}');
        out
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("", "\n", 0, false))
    }
}

/// Pairs each line with its relative depth, tracking running bracket depth
/// across lines. A line that begins with closers is dedented by them.
fn reindent(lines: &[String]) -> Vec<(&str, usize)> {
    let mut depth: usize = 0;
    lines
        .iter()
        .map(|line| {
            let leading_closers = line
                .bytes()
                .take_while(|&b| matches!(b, b')' | b']' | b'}'))
                .count();
            let line_depth = depth.saturating_sub(leading_closers);
            for b in brackets(line) {
                if closer_of(b).is_some() {
                    depth += 1;
                } else {
                    depth = depth.saturating_sub(1);
                }
            }
            (line.as_str(), line_depth)
        })
        .collect()
}

fn canonical_body(body: &str) -> String {
    let body = body.trim();
    if body.len() >= 2 && is_enclosed(body, b'{') {
        body.to_string()
    } else if body.len() >= 2 && is_enclosed(body, b'(') {
        format!("{{ return {}; }}", body)
    } else {
        format!("{{ return ({}); }}", body)
    }
}

/// `true` if `expr` can follow `=>` without parentheses: nothing at depth
/// zero would be cut by the element, member or arrow splits of the parser.
fn stands_alone(expr: &str) -> bool {
    [",", ":", ARROW]
        .iter()
        .all(|token| split_on_level(expr, token).len() == 1)
}

fn parse_params(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }
    split_on_level(list, ",")
        .into_iter()
        .map(|p| p.trim().to_string())
        .collect()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
