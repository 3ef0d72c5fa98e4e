//! Node arena for JSON++ documents.
//!
//! A [`Document`] owns every composite node of one value graph. Nodes refer
//! to each other through [`NodeId`] handles, so shared and cyclic structures
//! need no reference counting and carry no ownership cycles: identity is
//! handle equality.
//!
//! ## Building a document by hand
//!
//! ```rust
//! use serde_jsonpp::{stringify, Document, Map, Value};
//!
//! let mut doc = Document::new();
//! let inner = doc.mapping(Map::new());
//! let mut root = Map::new();
//! root.insert("first".to_string(), inner.clone());
//! root.insert("second".to_string(), inner);
//! let root = doc.mapping(root);
//! doc.set_root(root);
//!
//! assert_eq!(stringify(&doc), "{\"first\":{},\"second\":/\"first\"}");
//! ```

use crate::callable::Callable;
use crate::path::{Path, Segment};
use crate::value::{Node, NodeId, Tagged};
use crate::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// An arena of nodes plus the root value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: Value,
}

impl Document {
    /// Creates an empty document whose root is `null`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn set_root(&mut self, root: Value) {
        self.root = root;
    }

    /// Moves a node into the arena and returns its identity.
    pub fn insert(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn sequence(&mut self, items: Vec<Value>) -> Value {
        Value::Node(self.insert(Node::Sequence(items)))
    }

    pub fn mapping(&mut self, map: Map) -> Value {
        Value::Node(self.insert(Node::Mapping(map)))
    }

    pub fn tagged(&mut self, tagged: Tagged) -> Value {
        Value::Node(self.insert(Node::Tagged(tagged)))
    }

    pub fn callable(&mut self, callable: Callable) -> Value {
        Value::Node(self.insert(Node::Callable(callable)))
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Returns the node behind a value, if the value is a node handle.
    #[must_use]
    pub fn get(&self, value: &Value) -> Option<&Node> {
        value.as_node().and_then(|id| self.node(id))
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if both values are handles to the same node.
    #[must_use]
    pub fn same(a: &Value, b: &Value) -> bool {
        matches!((a, b), (Value::Node(x), Value::Node(y)) if x == y)
    }

    /// Returns the member of `value` addressed by one path segment.
    ///
    /// Keys address mapping members and tagged values (declared members
    /// first, then own fields). Indices address sequence elements and the
    /// elements of typed collections; on a tagged value without elements an
    /// index addresses the declared member at that position.
    #[must_use]
    pub fn child(&self, value: &Value, segment: &Segment) -> Option<&Value> {
        match (self.get(value)?, segment) {
            (Node::Sequence(items), Segment::Index(i)) => items.get(*i),
            (Node::Mapping(map), Segment::Key(key)) => map.get(key),
            (Node::Tagged(tagged), Segment::Key(key)) => tagged.get(key),
            (Node::Tagged(tagged), Segment::Index(i)) => match &tagged.elements {
                Some(items) => items.get(*i),
                None => tagged
                    .members
                    .get(*i)
                    .and_then(|m| tagged.fields.get(&m.field)),
            },
            _ => None,
        }
    }

    /// Walks `path` from the root.
    ///
    /// ```rust
    /// use serde_jsonpp::{parse, Path, Value};
    ///
    /// let doc = parse("{\"qux\":[0,1,{\"baz\":\"hit\"}]}").unwrap();
    /// let path = Path::parse("/\"qux\"[2]\"baz\"").unwrap();
    /// assert_eq!(doc.lookup(&path), Some(&Value::from("hit")));
    /// ```
    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(&self.root, |current, segment| self.child(current, segment))
    }

    /// Compares `a` in this document with `b` in `other`.
    ///
    /// Scalars compare by value and composites element-wise. Node identities
    /// must correspond one-to-one, so a shared node on one side must also be
    /// shared on the other, and cycles must close at the same place.
    #[must_use]
    pub fn structurally_eq(&self, a: &Value, other: &Document, b: &Value) -> bool {
        Matcher {
            left: self,
            right: other,
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
        .values(a, b)
    }
}

struct Matcher<'a> {
    left: &'a Document,
    right: &'a Document,
    forward: HashMap<NodeId, NodeId>,
    backward: HashMap<NodeId, NodeId>,
}

impl Matcher<'_> {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        let (Value::Node(x), Value::Node(y)) = (a, b) else {
            return a == b;
        };
        match (self.forward.get(x), self.backward.get(y)) {
            (Some(mapped), _) => return mapped == y,
            (None, Some(_)) => return false,
            (None, None) => {}
        }
        self.forward.insert(*x, *y);
        self.backward.insert(*y, *x);

        let (left, right) = (self.left, self.right);
        match (left.node(*x), right.node(*y)) {
            (Some(Node::Sequence(l)), Some(Node::Sequence(r))) => self.all(l, r),
            (Some(Node::Mapping(l)), Some(Node::Mapping(r))) => self.maps(l, r),
            (Some(Node::Tagged(l)), Some(Node::Tagged(r))) => {
                l.tag == r.tag
                    && l.members == r.members
                    && self.maps(&l.fields, &r.fields)
                    && match (&l.elements, &r.elements) {
                        (Some(le), Some(re)) => self.all(le, re),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (Some(Node::Callable(l)), Some(Node::Callable(r))) => l == r,
            _ => false,
        }
    }

    fn all(&mut self, l: &[Value], r: &[Value]) -> bool {
        l.len() == r.len() && l.iter().zip(r).all(|(a, b)| self.values(a, b))
    }

    fn maps(&mut self, l: &Map, r: &Map) -> bool {
        l.len() == r.len()
            && l.iter().all(|(key, a)| match r.get(key) {
                Some(b) => self.values(a, b),
                None => false,
            })
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::stringify(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cyclic() -> Document {
        let mut doc = Document::new();
        let id = doc.insert(Node::Mapping(Map::new()));
        if let Some(Node::Mapping(map)) = doc.node_mut(id) {
            map.insert("self".to_string(), Value::Node(id));
        }
        doc.set_root(Value::Node(id));
        doc
    }

    #[test]
    fn test_lookup_root_and_children() {
        let mut doc = Document::new();
        let seq = doc.sequence(vec![Value::from(1), Value::from("two")]);
        let mut map = Map::new();
        map.insert("items".to_string(), seq);
        let root = doc.mapping(map);
        doc.set_root(root.clone());

        assert_eq!(doc.lookup(&Path::root()), Some(&root));
        assert_eq!(
            doc.lookup(&Path::root().key("items").index(1)),
            Some(&Value::from("two"))
        );
        assert_eq!(doc.lookup(&Path::root().key("missing")), None);
        assert_eq!(doc.lookup(&Path::root().index(0)), None);
    }

    #[test]
    fn test_structural_eq_handles_cycles() {
        let a = cyclic();
        let b = cyclic();
        assert!(a.structurally_eq(a.root(), &b, b.root()));
    }

    #[test]
    fn test_structural_eq_distinguishes_sharing() {
        let mut shared = Document::new();
        let inner = shared.sequence(vec![]);
        let root = shared.sequence(vec![inner.clone(), inner]);
        shared.set_root(root);

        let mut copied = Document::new();
        let first = copied.sequence(vec![]);
        let second = copied.sequence(vec![]);
        let root = copied.sequence(vec![first, second]);
        copied.set_root(root);

        assert!(!shared.structurally_eq(shared.root(), &copied, copied.root()));
        assert!(!copied.structurally_eq(copied.root(), &shared, shared.root()));
        assert!(shared.structurally_eq(shared.root(), &shared.clone(), shared.root()));
    }

    #[test]
    fn test_same_is_identity() {
        let mut doc = Document::new();
        let a = doc.sequence(vec![]);
        let b = doc.sequence(vec![]);
        assert!(Document::same(&a, &a.clone()));
        assert!(!Document::same(&a, &b));
        assert!(!Document::same(&Value::Null, &Value::Null));
    }
}
