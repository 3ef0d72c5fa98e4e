//! # serde_jsonpp
//!
//! A parser and stringifier for JSON++, a JSON superset that can carry
//! object graphs: shared and cyclic references, type-tagged values rebuilt
//! through a caller-supplied registry, typed collections and callable
//! values.
//!
//! ## What does JSON++ add?
//!
//! - **References**: `/"qux"[2]"baz"` names another node of the same
//!   document by path; `/` is the root. A node written twice is written once
//!   and referenced afterwards, so cycles have a finite rendering.
//! - **Type tags**: `Point{"x":1,"y":2}` names a registered type, which is
//!   constructed from the mapping. `List{"size":2}[1,2]` is a typed
//!   collection with named state plus elements.
//! - **Callables**: `(a, b) => a + b` or `(a) => { ... }` are kept as
//!   structured values.
//! - **`undefined`** and single-quoted strings.
//!
//! There is no boolean literal.
//!
//! ## Grammar
//!
//! ```text
//! document  := sequence | typeTag? mapping
//! value     := "null" | "undefined" | string | number | reference
//!            | sequence | typeTag? mapping sequence? | typeTag sequence
//!            | callable
//! sequence  := "[" (value ("," value)*)? "]"
//! mapping   := "{" (string ":" value ("," string ":" value)*)? "}"
//! reference := "/" ( "\"" key "\"" | "[" index "]" )*
//! callable  := "(" params ")" "=>" (expression | "{" statements "}")
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_jsonpp::{parse, stringify, Document};
//!
//! let text = "{\"foo\":\"bar\",\"qux\":{\"baz\":/},\"quux\":/\"qux\"}";
//! let doc = parse(text).unwrap();
//!
//! // `qux.baz` is the root itself, `quux` is the same node as `qux`
//! let root = doc.get(doc.root()).and_then(|n| n.as_mapping()).unwrap();
//! let qux = doc.get(&root["qux"]).and_then(|n| n.as_mapping()).unwrap();
//! assert!(Document::same(&qux["baz"], doc.root()));
//! assert!(Document::same(&root["quux"], &root["qux"]));
//!
//! assert_eq!(stringify(&doc), text);
//! ```
//!
//! ### Registered types
//!
//! ```rust
//! use serde_jsonpp::{parse_with, stringify, Registry, TypeDef, Value};
//!
//! let registry = Registry::new().with(
//!     TypeDef::new("Temperature")
//!         .field("_celsius", Value::from(0))
//!         .member("celsius", "_celsius"),
//! );
//!
//! let doc = parse_with("[Temperature{\"celsius\":21}]", &registry).unwrap();
//! assert_eq!(stringify(&doc), "[Temperature{\"celsius\":21}]");
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_jsonpp::{from_str, to_string, Registry};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! let user = User { id: 7, name: "Alice".to_string(), tags: vec!["admin".to_string()] };
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "User{\"id\":7,\"name\":\"Alice\",\"tags\":[\"admin\"]}");
//!
//! let back: User = from_str(&text, &Registry::new()).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: parse and
//! stringify entry/exit and unregistered tags at `debug`, link resolution and
//! back-references at `trace`. No logger is installed by the library.

pub mod callable;
pub mod de;
pub mod document;
pub mod error;
mod format;
mod link;
pub mod map;
pub mod options;
mod parser;
pub mod path;
pub mod registry;
pub mod ser;
pub mod split;
pub mod stringify;
pub mod value;

pub use callable::Callable;
pub use de::Deserializer;
pub use document::Document;
pub use error::{Error, ErrorKind, Result};
pub use map::Map;
pub use options::{ForceMultiline, Indent, Key, Options};
pub use path::{Path, Segment};
pub use registry::{Arguments, Instance, Member, Registry, TypeDef};
pub use ser::DocumentSerializer;
pub use stringify::{stringify, stringify_value, stringify_with_options};
pub use value::{Node, NodeId, Number, Tagged, Value};

use serde::{Deserialize, Serialize};
use std::io;

/// Parses JSON++ text with no registered types.
///
/// Every type tag is kept as an unregistered [`Tagged`] value.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::{parse, Value};
///
/// let doc = parse("[\"foo\",\"bar\"]").unwrap();
/// let items = doc.get(doc.root()).and_then(|n| n.as_sequence()).unwrap();
/// assert_eq!(items, &vec![Value::from("foo"), Value::from("bar")]);
/// ```
///
/// # Errors
///
/// Returns an error if the text is not well-formed JSON++ or a reference
/// cannot be linked.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Document> {
    parse_with(text, &Registry::new())
}

/// Parses JSON++ text, constructing tagged values through `registry`.
///
/// # Errors
///
/// Returns an error if the text is not well-formed JSON++, a registered
/// type rejects its arguments, or a reference cannot be linked.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with(text: &str, registry: &Registry) -> Result<Document> {
    parser::parse_document(text, registry)
}

/// Converts any `T: Serialize` into a document.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::to_document;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let doc = to_document(&Point { x: 1, y: 2 }).unwrap();
/// let point = doc.get(doc.root()).and_then(|n| n.as_tagged()).unwrap();
/// assert_eq!(point.tag, "Point");
/// ```
///
/// # Errors
///
/// Returns an error if the value contains a type JSON++ cannot express,
/// such as `bool`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_document<T>(value: &T) -> Result<Document>
where
    T: ?Sized + Serialize,
{
    let mut doc = Document::new();
    let root = value.serialize(DocumentSerializer::new(&mut doc))?;
    doc.set_root(root);
    Ok(doc)
}

/// Serializes any `T: Serialize` to a compact JSON++ string.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &Options::default())
}

/// Serializes any `T: Serialize` to an indented JSON++ string.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::to_string_pretty;
///
/// assert_eq!(to_string_pretty(&vec![1, 2]).unwrap(), "[ 1, 2 ]");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &Options::pretty())
}

/// Serializes any `T: Serialize` to a JSON++ string with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &Options) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let doc = to_document(value)?;
    Ok(stringify_with_options(&doc, options))
}

/// Serializes any `T: Serialize` to a writer in compact JSON++.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec!["a"]).unwrap();
/// assert_eq!(buffer, b"[\"a\"]");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &Options::default())
}

/// Serializes any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &Options) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserializes an instance of `T` from a document.
///
/// # Errors
///
/// Returns an error if the document's shape does not match `T`, contains
/// a callable, or contains a cycle.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_document<'a, T>(doc: &'a Document) -> Result<T>
where
    T: Deserialize<'a>,
{
    T::deserialize(Deserializer::new(doc))
}

/// Parses JSON++ text and deserializes an instance of `T` from it.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::{from_str, Registry};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("Point{\"x\":1,\"y\":2}", &Registry::new()).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the text is not valid JSON++ or cannot be
/// deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(text: &str, registry: &Registry) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let doc = parse_with(text, registry)?;
    from_document(&doc)
}

/// Reads JSON++ from an I/O stream and deserializes an instance of `T`.
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::{from_reader, Registry};
/// use std::io::Cursor;
///
/// let numbers: Vec<i32> = from_reader(Cursor::new(b"[1,2,3]"), &Registry::new()).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid JSON++, or it
/// cannot be deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R, registry: &Registry) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&text, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        score: f64,
        tags: Vec<String>,
        home: Option<Point>,
    }

    fn user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            score: 9.5,
            tags: vec!["admin".to_string(), "user".to_string()],
            home: Some(Point { x: 1, y: 2 }),
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let text = to_string(&point).unwrap();
        let point_back: Point = from_str(&text, &Registry::new()).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let text = to_string(&user()).unwrap();
        let user_back: User = from_str(&text, &Registry::new()).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_pretty_printing() {
        let text = to_string_pretty(&user()).unwrap();
        let user_back: User = from_str(&text, &Registry::new()).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_multiline_round_trip() {
        let options = Options::pretty().with_multiline(true).with_line_ending("\r\n");
        let text = to_string_with_options(&user(), &options).unwrap();
        assert!(text.contains("\r\n"));
        let user_back: User = from_str(&text, &Registry::new()).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_to_document() {
        let doc = to_document(&Point { x: 1, y: 2 }).unwrap();
        let point = doc.get(doc.root()).and_then(Node::as_tagged).unwrap();
        assert_eq!(point.get("x"), Some(&Value::from(1)));
        assert_eq!(point.get("y"), Some(&Value::from(2)));
    }

    #[test]
    fn test_arrays() {
        let numbers = vec![1, 2, 3, 4, 5];
        let text = to_string(&numbers).unwrap();
        let numbers_back: Vec<i32> = from_str(&text, &Registry::new()).unwrap();
        assert_eq!(numbers, numbers_back);
    }

    #[test]
    fn test_writer_and_reader() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &Point { x: 3, y: 4 }).unwrap();
        let point: Point = from_reader(buffer.as_slice(), &Registry::new()).unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }
}
