//! [`Document`] to JSON++ text.
//!
//! The stringifier walks the value graph depth-first and remembers the path
//! at which each node was first written. When a node is reached again,
//! whether through sharing or a cycle, its path is emitted as a reference
//! instead of a second copy, so every graph has a finite rendering.
//!
//! ```rust
//! use serde_jsonpp::{parse, stringify};
//!
//! let text = "{\"foo\":\"bar\",\"qux\":{\"baz\":/},\"quux\":/\"qux\"}";
//! assert_eq!(stringify(&parse(text).unwrap()), text);
//! ```

use crate::format::Layout;
use crate::options::{Key, Options};
use crate::path::quote;
use crate::value::{NodeId, Tagged};
use crate::{Document, Map, Node, Path, Value};
use std::collections::{HashMap, HashSet};

/// Renders `doc` in compact form with every member visible.
#[must_use]
pub fn stringify(doc: &Document) -> String {
    stringify_with_options(doc, &Options::default())
}

/// Renders `doc` under `options`.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::{parse, stringify_with_options, Options};
///
/// let doc = parse("{\"a\":[1,2]}").unwrap();
/// let options = Options::pretty().with_multiline(true);
/// assert_eq!(
///     stringify_with_options(&doc, &options),
///     "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
/// );
/// ```
#[must_use]
pub fn stringify_with_options(doc: &Document, options: &Options) -> String {
    stringify_value(doc, doc.root(), options)
}

/// Renders one value of `doc` as if it were the root.
///
/// Back-references inside the output are relative to `value`, so the text
/// parses back to an equivalent graph only if every shared node lies below
/// `value`.
#[must_use]
pub fn stringify_value(doc: &Document, value: &Value, options: &Options) -> String {
    log::debug!("stringifying document of {} nodes", doc.len());
    let text = Stringifier::new(doc, options).value(value, &Path::root(), 0);
    log::debug!("stringified to {} bytes", text.len());
    text
}

struct Stringifier<'a> {
    doc: &'a Document,
    options: &'a Options,
    layout: Layout<'a>,
    visited: HashMap<NodeId, Path>,
}

impl<'a> Stringifier<'a> {
    fn new(doc: &'a Document, options: &'a Options) -> Self {
        Stringifier {
            doc,
            options,
            layout: Layout::new(options.indent.as_str(), &options.line_ending),
            visited: HashMap::new(),
        }
    }

    fn value(&mut self, value: &Value, path: &Path, level: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Number(n) if n.is_special() => quote(&n.to_string()),
            Value::Number(n) => n.to_string(),
            Value::String(s) => quote(s),
            Value::Node(id) => self.node(*id, path, level),
        }
    }

    fn node(&mut self, id: NodeId, path: &Path, level: usize) -> String {
        if let Some(first) = self.visited.get(&id) {
            log::trace!("node {} at {} refers back to {}", id, path, first);
            return first.to_string();
        }
        self.visited.insert(id, path.clone());

        let doc = self.doc;
        match doc.node(id) {
            Some(Node::Sequence(items)) => {
                let force = self.options.multiline.sequence;
                format!("[{}]", self.elements(items, path, force, level))
            }
            Some(Node::Mapping(map)) => {
                let entries = self.entries(map.iter(), path, level);
                let force = self.options.multiline.mapping;
                format!("{{{}}}", self.layout.join(&entries, force, level))
            }
            Some(Node::Tagged(tagged)) => self.tagged(tagged, path, level),
            Some(Node::Callable(callable)) => callable.render(
                self.layout.indent,
                self.layout.line_ending,
                level,
                self.options.multiline.callable,
            ),
            None => {
                log::debug!("node {} at {} is not in the document, writing undefined", id, path);
                "undefined".to_string()
            }
        }
    }

    /// Renders visible sequence items; the body goes between `[` and `]`.
    /// Paths use the emitted position.
    fn elements(&mut self, items: &[Value], path: &Path, force: bool, level: usize) -> String {
        let mut rendered = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let child = path.index(rendered.len());
            if self.options.includes(Key::Index(i), item, &child) {
                rendered.push(self.value(item, &child, level + 1));
            }
        }
        self.layout.join(&rendered, force, level)
    }

    /// Renders visible `"key":value` pairs.
    fn entries<'v, I>(&mut self, pairs: I, path: &Path, level: usize) -> Vec<String>
    where
        I: Iterator<Item = (&'v String, &'v Value)>,
    {
        let colon = self.layout.colon();
        let mut rendered = Vec::new();
        for (key, value) in pairs {
            let child = path.key(key);
            if self.options.includes(Key::Name(key), value, &child) {
                let text = self.value(value, &child, level + 1);
                rendered.push(format!("{}{}{}", quote(key), colon, text));
            }
        }
        rendered
    }

    /// `Tag{members and fields}` followed by `[elements]` for collections.
    fn tagged(&mut self, tagged: &Tagged, path: &Path, level: usize) -> String {
        let force = self.options.multiline.tagged();
        let visible = visible_state(tagged, self.options);
        let entries = self.entries(visible.iter(), path, level);

        let mut out = format!(
            "{}{}{{{}}}",
            tagged.tag,
            self.layout.tag_gap(),
            self.layout.join(&entries, force, level)
        );
        if let Some(items) = &tagged.elements {
            out.push('[');
            out.push_str(&self.elements(items, path, force, level));
            out.push(']');
        }
        out
    }
}

/// The named state of a tagged value that is written out: declared members
/// first when enabled, then own fields not already written through a
/// member's backing field.
///
/// An own field whose name equals a declared member's name is left out when
/// members are written: read back, that key would be routed through the
/// member to its backing field.
pub(crate) fn visible_state(tagged: &Tagged, options: &Options) -> Map {
    let mut state = Map::new();
    let mut covered = HashSet::new();
    if options.declared_members {
        for member in &tagged.members {
            covered.insert(member.field.as_str());
            if let Some(value) = tagged.fields.get(&member.field) {
                state.insert(member.name.clone(), value.clone());
            }
        }
    }
    if options.own_data {
        for (key, value) in &tagged.fields {
            if covered.contains(key.as_str()) {
                continue;
            }
            if state.contains_key(key) {
                log::debug!(
                    "`{}` field `{}` is shadowed by a declared member and is not written",
                    tagged.tag,
                    key
                );
                continue;
            }
            state.insert(key.clone(), value.clone());
        }
    }
    state
}
