//! Serde serialization into a [`Document`].
//!
//! [`DocumentSerializer`] turns any `T: Serialize` into nodes of a document,
//! which [`stringify`](crate::stringify) then renders. The mapping is:
//!
//! - structs become tagged values named after the struct (`Point{"x":1}`)
//! - maps become mappings; keys must serialize to strings or numbers
//! - sequences, tuples and tuple structs become sequences
//! - `()`, unit structs and `None` become `null`
//! - unit variants become strings; other variants become `{"Variant":payload}`
//!
//! JSON++ has no boolean literal, so `bool` is rejected.
//!
//! ## Usage
//!
//! ```rust
//! use serde_jsonpp::to_string;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "Point{\"x\":1,\"y\":2}");
//! assert_eq!(to_string(&vec![1, 2, 3]).unwrap(), "[1,2,3]");
//! ```

use crate::value::Tagged;
use crate::{Document, Error, Map, Number, Result, Value};
use serde::{ser, Serialize};

/// Serializes into the arena of a borrowed document and returns the
/// produced value. The caller decides where the value goes, usually
/// [`Document::set_root`].
///
/// # Examples
///
/// ```rust
/// use serde_jsonpp::{stringify, Document, DocumentSerializer};
/// use serde::Serialize;
///
/// let mut doc = Document::new();
/// let root = vec!["a", "b"].serialize(DocumentSerializer::new(&mut doc)).unwrap();
/// doc.set_root(root);
/// assert_eq!(stringify(&doc), "[\"a\",\"b\"]");
/// ```
pub struct DocumentSerializer<'a> {
    doc: &'a mut Document,
}

impl<'a> DocumentSerializer<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        DocumentSerializer { doc }
    }
}

/// Collects elements of sequences, tuples and tuple variants.
pub struct SerializeVec<'a> {
    doc: &'a mut Document,
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

/// Collects entries of maps, structs and struct variants.
pub struct SerializeMap<'a> {
    doc: &'a mut Document,
    map: Map,
    current_key: Option<String>,
    shape: Shape,
}

enum Shape {
    Map,
    Struct(&'static str),
    Variant(&'static str),
}

impl<'a> ser::Serializer for DocumentSerializer<'a> {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec<'a>;
    type SerializeTuple = SerializeVec<'a>;
    type SerializeTupleStruct = SerializeVec<'a>;
    type SerializeTupleVariant = SerializeVec<'a>;
    type SerializeMap = SerializeMap<'a>;
    type SerializeStruct = SerializeMap<'a>;
    type SerializeStructVariant = SerializeMap<'a>;

    fn serialize_bool(self, _v: bool) -> Result<Value> {
        Err(Error::unsupported_type("bool has no JSON++ literal"))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        match i64::try_from(v) {
            Ok(i) => Ok(Value::Number(Number::Integer(i))),
            Err(_) => Ok(Value::Number(Number::Float(v as f64))),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let items = v.iter().map(|&b| Value::from(b)).collect();
        Ok(self.doc.sequence(items))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let payload = value.serialize(DocumentSerializer::new(&mut *self.doc))?;
        Ok(wrap_variant(self.doc, variant, payload))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.doc, len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.doc, len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.doc, len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.doc, len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap<'a>> {
        Ok(SerializeMap::new(self.doc, Shape::Map))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<SerializeMap<'a>> {
        Ok(SerializeMap::new(self.doc, Shape::Struct(name)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap<'a>> {
        Ok(SerializeMap::new(self.doc, Shape::Variant(variant)))
    }
}

impl<'a> SerializeVec<'a> {
    fn new(doc: &'a mut Document, capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            doc,
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let value = value.serialize(DocumentSerializer::new(&mut *self.doc))?;
        self.vec.push(value);
        Ok(())
    }

    fn finish(self) -> Value {
        let seq = self.doc.sequence(self.vec);
        match self.variant {
            Some(variant) => wrap_variant(self.doc, variant, seq),
            None => seq,
        }
    }
}

impl<'a> SerializeMap<'a> {
    fn new(doc: &'a mut Document, shape: Shape) -> Self {
        SerializeMap {
            doc,
            map: Map::new(),
            current_key: None,
            shape,
        }
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = value.serialize(DocumentSerializer::new(&mut *self.doc))?;
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn finish(self) -> Value {
        match self.shape {
            Shape::Map => self.doc.mapping(self.map),
            Shape::Struct(name) => {
                let mut tagged = Tagged::new(name);
                tagged.fields = self.map;
                self.doc.tagged(tagged)
            }
            Shape::Variant(variant) => {
                let inner = self.doc.mapping(self.map);
                wrap_variant(self.doc, variant, inner)
            }
        }
    }
}

fn wrap_variant(doc: &mut Document, variant: &str, payload: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(variant.to_string(), payload);
    doc.mapping(map)
}

impl ser::SerializeSeq for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(DocumentSerializer::new(&mut *self.doc))? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            Value::Number(n) => {
                self.current_key = Some(n.to_string());
                Ok(())
            }
            _ => Err(Error::custom("Map keys must be strings or numbers")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.field(&key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stringify, Node};
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn render<T: Serialize>(value: &T) -> String {
        let mut doc = Document::new();
        let root = value.serialize(DocumentSerializer::new(&mut doc)).unwrap();
        doc.set_root(root);
        stringify(&doc)
    }

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: f64,
    }

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(f64),
        Line(i32, i32),
        Rect { w: u8, h: u8 },
    }

    #[test]
    fn test_struct_becomes_tagged() {
        let mut doc = Document::new();
        let root = Point { x: 1, y: 2.5 }
            .serialize(DocumentSerializer::new(&mut doc))
            .unwrap();
        let tagged = doc.get(&root).and_then(Node::as_tagged).unwrap();
        assert_eq!(tagged.tag, "Point");
        assert!(!tagged.registered);
        assert_eq!(tagged.fields.get("y"), Some(&Value::from(2.5)));
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(render(&Shape::Empty), "\"Empty\"");
        assert_eq!(render(&vec![Shape::Circle(1.0)]), "[{\"Circle\":1.0}]");
        assert_eq!(render(&vec![Shape::Line(1, 2)]), "[{\"Line\":[1,2]}]");
        assert_eq!(
            render(&vec![Shape::Rect { w: 3, h: 4 }]),
            "[{\"Rect\":{\"w\":3,\"h\":4}}]"
        );
    }

    #[test]
    fn test_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(2, "two");
        map.insert(1, "one");
        assert_eq!(render(&map), "{\"1\":\"one\",\"2\":\"two\"}");
    }

    #[test]
    fn test_options_and_units() {
        assert_eq!(render(&vec![Some(1), None]), "[1,null]");
        assert_eq!(render(&((), 1u64)), "[null,1]");
    }

    #[test]
    fn test_bool_is_rejected() {
        let mut doc = Document::new();
        let err = true
            .serialize(DocumentSerializer::new(&mut doc))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Serde);
    }

    #[test]
    fn test_large_u64_becomes_float() {
        let mut doc = Document::new();
        let value = u64::MAX.serialize(DocumentSerializer::new(&mut doc)).unwrap();
        assert!(matches!(value, Value::Number(Number::Float(_))));
    }
}
