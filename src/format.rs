//! Layout policy for composite bodies.
//!
//! The stringifier renders each child first and then asks [`Layout::join`]
//! how to lay them out between the brackets.

/// Children whose `", "`-joined text is longer than this go multi-line.
pub(crate) const MAX_LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout<'a> {
    pub indent: &'a str,
    pub line_ending: &'a str,
}

impl<'a> Layout<'a> {
    pub(crate) fn new(indent: &'a str, line_ending: &'a str) -> Self {
        Layout {
            indent,
            line_ending,
        }
    }

    pub(crate) fn is_compact(&self) -> bool {
        self.indent.is_empty()
    }

    /// Separator between a mapping key and its value.
    pub(crate) fn colon(&self) -> &'static str {
        if self.is_compact() {
            ":"
        } else {
            ": "
        }
    }

    /// Separator between a type tag and its opening brace.
    pub(crate) fn tag_gap(&self) -> &'static str {
        if self.is_compact() {
            ""
        } else {
            " "
        }
    }

    /// Joins rendered children of a composite at nesting `level`; the result
    /// goes between the brackets.
    ///
    /// Compact output is never multi-line. Otherwise children go on their
    /// own lines when `force` is set, when any child already spans lines, or
    /// when the single-line form would be too wide.
    pub(crate) fn join(&self, children: &[String], force: bool, level: usize) -> String {
        if self.is_compact() {
            return children.join(",");
        }
        if children.is_empty() {
            return String::new();
        }

        let inline = children.join(", ");
        if !force && !is_multiline(&inline, children) {
            return format!(" {} ", inline);
        }

        let eol = self.line_ending;
        let pad = self.indent.repeat(level + 1);
        let separator = format!(",{}{}", eol, pad);
        format!(
            "{}{}{}{}{}",
            eol,
            pad,
            children.join(&separator),
            eol,
            self.indent.repeat(level)
        )
    }
}

fn is_multiline(inline: &str, children: &[String]) -> bool {
    inline.chars().count() > MAX_LINE_WIDTH || children.iter().any(|c| c.contains('\n'))
}
