//! Value representation for JSON++ documents.
//!
//! Scalars live inline in [`Value`]; every composite (sequence, mapping,
//! tagged instance, callable) lives in the arena of a
//! [`Document`](crate::Document) and is referred to by a [`NodeId`]. Two
//! values holding the same `NodeId` are the same node, which is how shared
//! and cyclic structures are represented.
//!
//! ## Core Types
//!
//! - [`Value`]: null, undefined, number, string, or a handle to a node
//! - [`Number`]: integer or floating point, decided by the source text
//! - [`Node`]: the composite kinds stored in the arena
//! - [`Tagged`]: a reconstructed instance of a named type
//!
//! ## Examples
//!
//! ```rust
//! use serde_jsonpp::{Value, Number};
//!
//! let null = Value::Null;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! assert!(null.is_null());
//! assert_eq!(number, Value::Number(Number::Integer(42)));
//! assert_eq!(text.as_str(), Some("hello"));
//! ```

use crate::callable::Callable;
use crate::registry::Member;
use crate::Map;
use std::fmt;

/// Identity of a composite node inside a [`Document`](crate::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in its document's arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A JSON++ value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Undefined,
    Number(Number),
    String(String),
    Node(NodeId),
}

/// A numeric value.
///
/// The kind is decided by the source text: a `.` or exponent makes a float.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::Number;
///
/// assert!(Number::Integer(42).is_integer());
/// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
/// assert_eq!(Number::Float(2.0).to_string(), "2.0");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// `true` for NaN and the infinities, which have no numeric literal.
    #[inline]
    #[must_use]
    pub fn is_special(&self) -> bool {
        matches!(self, Number::Float(f) if !f.is_finite())
    }

    /// Converts this number to an `i64` if it has no fractional part and
    /// fits the range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// Parses numeric source text.
    ///
    /// Text containing a `.` is a float; otherwise an integer, falling back to
    /// a float for exponents and integers beyond the `i64` range. Words such
    /// as `inf` or `NaN` are not numbers.
    #[must_use]
    pub fn parse(text: &str) -> Option<Number> {
        let valid = !text.is_empty()
            && text.bytes().any(|b| b.is_ascii_digit())
            && text
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'));
        if !valid {
            return None;
        }
        if text.contains('.') {
            return text.parse::<f64>().ok().map(Number::Float);
        }
        text.parse::<i64>()
            .map(Number::Integer)
            .ok()
            .or_else(|| text.parse::<f64>().ok().map(Number::Float))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) if fl.is_nan() => write!(f, "NaN"),
            Number::Float(fl) if fl.is_infinite() => {
                write!(f, "{}", if *fl > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Number::Float(fl) => {
                let text = fl.to_string();
                if text.contains('.') || text.contains('e') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
        }
    }
}

macro_rules! number_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(value as i64)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::Integer(value as i64))
                }
            }
        )*
    };
}

number_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value as f64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is a handle to a composite node.
    #[inline]
    #[must_use]
    pub const fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is an integer or a whole-number float, returns it.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::Float(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<NodeId> for Value {
    fn from(value: NodeId) -> Self {
        Value::Node(value)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::custom(format!("expected integer, found {:?}", value)))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::custom(format!("expected number, found {:?}", value)))
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {:?}",
                value
            ))),
        }
    }
}

/// A composite node stored in a document arena.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Sequence(Vec<Value>),
    Mapping(Map),
    Tagged(Tagged),
    Callable(Callable),
}

impl Node {
    /// Short name of the node kind, used in messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
            Node::Tagged(_) => "tagged value",
            Node::Callable(_) => "callable",
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Map> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tagged(&self) -> Option<&Tagged> {
        match self {
            Node::Tagged(tagged) => Some(tagged),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Node::Callable(callable) => Some(callable),
            _ => None,
        }
    }
}

/// An instance of a named type.
///
/// `fields` is the instance's own data. `members` are the read/write members
/// its type declares, each backed by one field. A typed collection also
/// carries `elements`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tagged {
    pub tag: String,
    pub fields: Map,
    pub elements: Option<Vec<Value>>,
    pub members: Vec<Member>,
    /// `false` when the tag was not found in the registry and the value was
    /// kept as annotated data.
    pub registered: bool,
}

impl Tagged {
    /// Creates an unregistered tagged value with no state.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Tagged {
            tag: tag.to_string(),
            fields: Map::new(),
            elements: None,
            members: Vec::new(),
            registered: false,
        }
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Reads a named value: a declared member through its backing field,
    /// otherwise an own field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.member(name) {
            Some(member) => self.fields.get(&member.field),
            None => self.fields.get(name),
        }
    }

    /// `true` if `name` is an own field or a declared member.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.member(name).is_some() || self.fields.contains_key(name)
    }

    /// Writes a named value, routing declared members to their backing
    /// field.
    pub fn set(&mut self, name: &str, value: Value) {
        let field = match self.member(name) {
            Some(member) => member.field.clone(),
            None => name.to_string(),
        };
        self.fields.insert(field, value);
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.elements.is_some()
    }
}
