//! JSON++ text to [`Document`].
//!
//! Parsing is top-down: a span is classified by its first characters, cut
//! into members with [`split_on_level`] and each member is parsed
//! recursively. Every composite is registered under the path it was built
//! at, after its children, so a reference to an already-built node is
//! resolved on the spot. References to nodes that do not exist yet leave an
//! `undefined` placeholder and are queued for the linker.
//!
//! ```rust
//! use serde_jsonpp::{parse, Document};
//!
//! let doc = parse("{\"foo\":[1,2],\"bar\":/\"foo\"}").unwrap();
//! let root = doc.get(doc.root()).and_then(|n| n.as_mapping()).unwrap();
//! assert!(Document::same(&root["foo"], &root["bar"]));
//! ```

use crate::callable::Callable;
use crate::link::{self, Link};
use crate::path::{find_closing_quote, unescape};
use crate::registry::{Arguments, Registry};
use crate::split::{brackets, find_unquoted, is_balanced, is_enclosed, matching_close, split_on_level};
use crate::value::{Node, NodeId, Tagged};
use crate::{Document, Error, Map, Number, Path, Result, Value};

/// Parses `text` into a document, resolving tags against `registry`.
pub(crate) fn parse_document(text: &str, registry: &Registry) -> Result<Document> {
    log::debug!("parsing {} bytes of JSON++", text.len());

    let mut parser = Parser::new(registry);
    let root = parser.root(text)?;
    parser.doc.set_root(root);

    let Parser {
        mut doc,
        paths,
        links,
        ..
    } = parser;
    log::debug!(
        "parsed {} nodes, {} deferred links",
        doc.len(),
        links.len()
    );
    link::resolve(&mut doc, &paths, links)?;
    Ok(doc)
}

struct Parser<'r> {
    registry: &'r Registry,
    doc: Document,
    /// Built nodes in completion order; later entries win on lookup.
    paths: Vec<(Path, NodeId)>,
    links: Vec<Link>,
}

impl<'r> Parser<'r> {
    fn new(registry: &'r Registry) -> Self {
        Parser {
            registry,
            doc: Document::new(),
            paths: Vec::new(),
            links: Vec::new(),
        }
    }

    fn root(&mut self, text: &str) -> Result<Value> {
        let text = text.trim();
        let root = Path::root();
        if text.starts_with('[') {
            return self.sequence(text, &root);
        }
        match type_prefix(text) {
            Some((None, body)) if body.starts_with('{') => self.mapping(body, &root),
            Some((Some(tag), body)) => self.tagged(tag, body, &root),
            _ => Err(Error::structural(
                "document root must be a sequence, a mapping or a typed mapping",
                text,
            )),
        }
    }

    fn value(&mut self, text: &str, path: &Path) -> Result<Value> {
        let text = text.trim();
        match text {
            "" => return Err(Error::unknown_value(text)),
            "null" => return Ok(Value::Null),
            "undefined" => return Ok(Value::Undefined),
            _ => {}
        }

        match text.as_bytes()[0] {
            b'[' => return self.sequence(text, path),
            b'{' => return self.mapping(text, path),
            b'/' => return self.reference(text, path),
            b'"' | b'\'' => {
                if let Some(inner) = quoted(text) {
                    return Ok(Value::String(unescape(inner)));
                }
            }
            _ => {}
        }

        if let Some(number) = Number::parse(text) {
            return Ok(Value::Number(number));
        }
        if let Some((Some(tag), body)) = type_prefix(text) {
            return self.tagged(tag, body, path);
        }
        if let Some(callable) = Callable::try_parse(text) {
            let id = self.doc.insert(Node::Callable(callable?));
            return Ok(self.register(path, id));
        }
        Err(Error::unknown_value(text))
    }

    fn sequence(&mut self, text: &str, path: &Path) -> Result<Value> {
        if !is_enclosed(text, b'[') {
            return Err(Error::structural("unbalanced sequence", text));
        }
        let items = self.elements(&text[1..text.len() - 1], path, 0)?;
        let id = self.doc.insert(Node::Sequence(items));
        Ok(self.register(path, id))
    }

    fn mapping(&mut self, text: &str, path: &Path) -> Result<Value> {
        if !is_enclosed(text, b'{') {
            return Err(Error::structural("unbalanced mapping", text));
        }
        let map = self.members(&text[1..text.len() - 1], path)?;
        let id = self.doc.insert(Node::Mapping(map));
        Ok(self.register(path, id))
    }

    /// Parses the comma-separated body of a sequence. Element `i` is built at
    /// `path[offset + i]`.
    fn elements(&mut self, body: &str, path: &Path, offset: usize) -> Result<Vec<Value>> {
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        split_on_level(body, ",")
            .into_iter()
            .enumerate()
            .map(|(i, element)| {
                if split_on_level(element, ":").len() != 1 {
                    return Err(Error::structural(
                        "sequence element must be a single value",
                        element,
                    ));
                }
                self.value(element, &path.index(offset + i))
            })
            .collect()
    }

    /// Parses the comma-separated `key:value` pairs of a mapping body.
    fn members(&mut self, body: &str, path: &Path) -> Result<Map> {
        let mut map = Map::new();
        if body.trim().is_empty() {
            return Ok(map);
        }
        for member in split_on_level(body, ",") {
            let parts = split_on_level(member, ":");
            let [key, value] = parts.as_slice() else {
                return Err(Error::structural(
                    "mapping member must be a `key:value` pair",
                    member,
                ));
            };
            let key = mapping_key(key)?;
            let value = self.value(value, &path.key(&key))?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Parses `Tag{...}`, `Tag{...}[...]` or `Tag[...]`. `body` starts at the
    /// opening bracket.
    fn tagged(&mut self, tag: &str, body: &str, path: &Path) -> Result<Value> {
        let close = matching_close(body, 0)
            .ok_or_else(|| Error::structural("unbalanced type arguments", body))?;
        let (head, rest) = body.split_at(close + 1);
        let inner = &head[1..head.len() - 1];
        let rest = rest.trim();

        let args = if head.starts_with('{') {
            Arguments::Named(self.members(inner, path)?)
        } else {
            Arguments::Positional(self.elements(inner, path, 0)?)
        };

        let trailing = match (&args, rest) {
            (_, "") => None,
            (Arguments::Named(_), rest) if is_enclosed(rest, b'[') => Some(&rest[1..rest.len() - 1]),
            _ => {
                return Err(Error::structural(
                    "unexpected text after type arguments",
                    body,
                ))
            }
        };

        let mut tagged = match self.registry.get(tag) {
            Some(def) => def.construct(args)?,
            None => {
                log::debug!("type `{}` is not registered, keeping it as annotated data", tag);
                unregistered(tag, args)
            }
        };

        if let Some(body) = trailing {
            let offset = tagged.elements.as_ref().map_or(0, Vec::len);
            let items = self.elements(body, path, offset)?;
            tagged.elements.get_or_insert_with(Vec::new).extend(items);
        }

        let id = self.doc.insert(Node::Tagged(tagged));
        Ok(self.register(path, id))
    }

    fn reference(&mut self, text: &str, path: &Path) -> Result<Value> {
        let target = Path::parse(text)?;
        if let Some(id) = self.find(&target) {
            return Ok(Value::Node(id));
        }
        log::trace!("deferring link {} -> {}", path, target);
        self.links.push(Link {
            at: path.clone(),
            target,
        });
        Ok(Value::Undefined)
    }

    fn register(&mut self, path: &Path, id: NodeId) -> Value {
        self.paths.push((path.clone(), id));
        Value::Node(id)
    }

    fn find(&self, target: &Path) -> Option<NodeId> {
        link::find(&self.paths, target)
    }
}

fn unregistered(tag: &str, args: Arguments) -> Tagged {
    let mut tagged = Tagged::new(tag);
    match args {
        Arguments::Named(fields) => tagged.fields = fields,
        Arguments::Positional(items) => tagged.elements = Some(items),
    }
    tagged
}

/// Splits `text` at its first structural `{` or `[` into an optional type
/// tag and the bracketed remainder.
///
/// Returns `None` if there is no such bracket or the text before it is not a
/// type name.
fn type_prefix(text: &str) -> Option<(Option<&str>, &str)> {
    let open = find_unquoted(text, b"{[")?;
    let prefix = text[..open].trim();
    if prefix.is_empty() {
        return Some((None, &text[open..]));
    }
    if !is_balanced(&brackets(prefix)) || !is_type_name(prefix) {
        return None;
    }
    Some((Some(prefix), &text[open..]))
}

fn is_type_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(text, "null" | "undefined")
}

/// Returns the content of a token that is exactly one quoted string.
fn quoted(text: &str) -> Option<&str> {
    let quote = *text.as_bytes().first()?;
    let end = find_closing_quote(text, 1, quote)?;
    (end == text.len() - 1).then(|| &text[1..end])
}

/// Mapping keys are quoted strings; numeric keys are accepted and kept as
/// their text.
fn mapping_key(text: &str) -> Result<String> {
    let text = text.trim();
    if let Some(inner) = quoted(text) {
        return Ok(unescape(inner));
    }
    match Number::parse(text) {
        Some(number) => Ok(number.to_string()),
        None => Err(Error::structural("mapping key must be a string", text)),
    }
}
