//! Serde deserialization from a [`Document`].
//!
//! The [`Deserializer`] walks a parsed document and feeds it to any
//! `T: Deserialize`. Shared nodes are simply visited again, once per place
//! they occur. A cycle cannot be represented by an owned Rust value, so
//! reaching a node that is already being deserialized is an error.
//!
//! ## Usage
//!
//! ```rust
//! use serde_jsonpp::{from_str, Registry};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = from_str("Data{\"x\":1,\"y\":2}", &Registry::new()).unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```
//!
//! ## Shape Mapping
//!
//! - sequences deserialize as sequences, mappings as maps
//! - tagged values deserialize as maps of their declared members followed by
//!   their own fields, or as sequences when they only carry elements
//! - `null` and `undefined` deserialize as unit or `None`
//! - callables are rejected

use crate::value::{Node, NodeId, Tagged};
use crate::{Document, Error, Number, Result, Value};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

/// Deserializer over one value of a borrowed document.
pub struct Deserializer<'de> {
    doc: &'de Document,
    value: &'de Value,
    /// Nodes currently being deserialized, outermost first.
    ancestors: Vec<NodeId>,
}

impl<'de> Deserializer<'de> {
    /// Starts at the document root.
    pub fn new(doc: &'de Document) -> Self {
        Self::at(doc, doc.root())
    }

    /// Starts at any value of `doc`.
    pub fn at(doc: &'de Document, value: &'de Value) -> Self {
        Deserializer {
            doc,
            value,
            ancestors: Vec::new(),
        }
    }

    fn child(&self, value: &'de Value) -> Self {
        Deserializer {
            doc: self.doc,
            value,
            ancestors: self.ancestors.clone(),
        }
    }

    /// Resolves the current value to a node, entering it.
    fn enter(&mut self, id: NodeId) -> Result<&'de Node> {
        if self.ancestors.contains(&id) {
            return Err(Error::custom(format!(
                "cyclic reference to node {} cannot be deserialized",
                id
            )));
        }
        self.ancestors.push(id);
        self.doc
            .node(id)
            .ok_or_else(|| Error::custom(format!("dangling node {}", id)))
    }
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let value = self.value;
        match value {
            Value::Null | Value::Undefined => visitor.visit_unit(),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(*i),
            Value::Number(Number::Float(f)) => visitor.visit_f64(*f),
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Node(id) => match self.enter(*id)? {
                Node::Sequence(items) => visitor.visit_seq(SeqAccess::new(&self, items)),
                Node::Mapping(map) => {
                    let entries = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
                    visitor.visit_map(MapAccess::new(&self, entries))
                }
                Node::Tagged(tagged) => match tagged_shape(tagged) {
                    TaggedShape::Elements(items) => visitor.visit_seq(SeqAccess::new(&self, items)),
                    TaggedShape::State(entries) => visitor.visit_map(MapAccess::new(&self, entries)),
                },
                Node::Callable(_) => Err(Error::unsupported_type("callables cannot be deserialized")),
            },
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null | Value::Undefined => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        mut self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let value = self.value;
        match value {
            Value::String(s) => visitor.visit_enum(s.as_str().into_deserializer()),
            Value::Node(id) => match self.enter(*id)? {
                Node::Mapping(map) if map.len() == 1 => {
                    let Some((variant, payload)) = map.iter().next() else {
                        return Err(Error::custom("expected a single-entry mapping"));
                    };
                    visitor.visit_enum(EnumAccess {
                        variant: variant.as_str(),
                        payload: self.child(payload),
                    })
                }
                _ => Err(Error::custom(
                    "expected a string or a single-entry mapping for an enum",
                )),
            },
            _ => Err(Error::custom(
                "expected a string or a single-entry mapping for an enum",
            )),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

enum TaggedShape<'de> {
    Elements(&'de [Value]),
    State(Vec<(&'de str, &'de Value)>),
}

/// Declared members first, then own fields not backing a member. A
/// collection with no named state is its elements.
fn tagged_shape(tagged: &Tagged) -> TaggedShape<'_> {
    let mut entries: Vec<(&str, &Value)> = Vec::new();
    for member in &tagged.members {
        if let Some(value) = tagged.fields.get(&member.field) {
            entries.push((member.name.as_str(), value));
        }
    }
    for (key, value) in &tagged.fields {
        let backs_member = tagged.members.iter().any(|m| &m.field == key);
        if !backs_member && !entries.iter().any(|(name, _)| name == key) {
            entries.push((key.as_str(), value));
        }
    }
    match &tagged.elements {
        Some(items) if entries.is_empty() => TaggedShape::Elements(items),
        _ => TaggedShape::State(entries),
    }
}

struct SeqAccess<'de> {
    parent: Deserializer<'de>,
    iter: std::slice::Iter<'de, Value>,
}

impl<'de> SeqAccess<'de> {
    fn new(parent: &Deserializer<'de>, items: &'de [Value]) -> Self {
        SeqAccess {
            parent: parent.child(parent.value),
            iter: items.iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(self.parent.child(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapAccess<'de> {
    parent: Deserializer<'de>,
    iter: std::vec::IntoIter<(&'de str, &'de Value)>,
    value: Option<&'de Value>,
}

impl<'de> MapAccess<'de> {
    fn new(parent: &Deserializer<'de>, entries: Vec<(&'de str, &'de Value)>) -> Self {
        MapAccess {
            parent: parent.child(parent.value),
            iter: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(BorrowedStrDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called without next_key_seed"))?;
        seed.deserialize(self.parent.child(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumAccess<'de> {
    variant: &'de str,
    payload: Deserializer<'de>,
}

impl<'de> de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = Error;
    type Variant = Deserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Deserializer<'de>)>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))?;
        Ok((variant, self.payload))
    }
}

impl<'de> de::VariantAccess<'de> for Deserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        <() as de::Deserialize>::deserialize(self)
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_any(self, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_any(self, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    fn from_doc<'a, T: Deserialize<'a>>(doc: &'a Document) -> Result<T> {
        T::deserialize(Deserializer::new(doc))
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Line(i32, i32),
        Rect { w: u8, h: u8 },
    }

    #[test]
    fn test_sequence_of_numbers() {
        let doc = parse("[1,2,3]").unwrap();
        let numbers: Vec<i64> = from_doc(&doc).unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_borrowed_strings() {
        let doc = parse("{\"a\":\"x\",\"b\":\"y\"}").unwrap();
        let map: BTreeMap<&str, &str> = from_doc(&doc).unwrap();
        assert_eq!(map.get("a"), Some(&"x"));
    }

    #[test]
    fn test_shared_nodes_are_copied() {
        let doc = parse("{\"a\":[1],\"b\":/\"a\"}").unwrap();
        let map: BTreeMap<String, Vec<i32>> = from_doc(&doc).unwrap();
        assert_eq!(map["a"], map["b"]);
    }

    #[test]
    fn test_cycle_is_error() {
        let doc = parse("{\"self\":/}").unwrap();
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Loop {
            #[serde(rename = "self")]
            me: Box<Option<Loop>>,
        }
        let err = from_doc::<Loop>(&doc).unwrap_err();
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn test_enums() {
        let doc = parse("[\"Empty\",{\"Circle\":1.5},{\"Line\":[1,2]},{\"Rect\":{\"w\":3,\"h\":4}}]")
            .unwrap();
        let shapes: Vec<Shape> = from_doc(&doc).unwrap();
        assert_eq!(
            shapes,
            vec![
                Shape::Empty,
                Shape::Circle(1.5),
                Shape::Line(1, 2),
                Shape::Rect { w: 3, h: 4 },
            ]
        );
    }

    #[test]
    fn test_options() {
        let doc = parse("[null,undefined,5]").unwrap();
        let values: Vec<Option<i32>> = from_doc(&doc).unwrap();
        assert_eq!(values, vec![None, None, Some(5)]);
    }

    #[test]
    fn test_tagged_collection_as_sequence() {
        let doc = parse("List{}[1,2]").unwrap();
        let items: Vec<i32> = from_doc(&doc).unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_callable_is_rejected() {
        let doc = parse("[(a) => a]").unwrap();
        let err = from_doc::<Vec<BTreeMap<String, i32>>>(&doc).unwrap_err();
        assert!(err.to_string().contains("callable"));
    }
}
