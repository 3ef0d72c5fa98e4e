//! Constructor registry for type-tagged values.
//!
//! A tag such as `Point` in `Point{"x":1,"y":2}` names a type the caller has
//! registered. Each [`TypeDef`] declares, alongside its factory, the ordered
//! read/write members it exposes for serialization, so no runtime reflection
//! is needed in either direction.
//!
//! ## Examples
//!
//! ```rust
//! use serde_jsonpp::{parse_with, Registry, TypeDef, Value};
//!
//! let registry = Registry::new().with(
//!     TypeDef::new("A")
//!         .collection()
//!         .field("_foo", Value::from("foo"))
//!         .member("Foo", "_foo"),
//! );
//!
//! let doc = parse_with("A {\"Foo\":\"bar\"}[\"1\",2,\"3\"]", &registry).unwrap();
//! let a = doc.get(doc.root()).and_then(|n| n.as_tagged()).unwrap();
//! assert_eq!(a.fields.get("_foo"), Some(&Value::from("bar")));
//! assert_eq!(a.elements.as_ref().map(Vec::len), Some(3));
//! ```

use crate::value::Tagged;
use crate::{Error, Map, Result, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A declared read/write member: the public `name` reads and writes the
/// instance field `field`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub field: String,
}

impl Member {
    #[must_use]
    pub fn new(name: &str, field: &str) -> Self {
        Member {
            name: name.to_string(),
            field: field.to_string(),
        }
    }
}

/// Constructor arguments parsed from the text following a type tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Arguments {
    /// `Tag{"k":v,...}`: one named-argument bundle
    Named(Map),
    /// `Tag[v,...]`: positional arguments
    Positional(Vec<Value>),
}

/// The state a factory produces.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Instance {
    pub fields: Map,
    pub elements: Option<Vec<Value>>,
}

impl Instance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty instance that is also a collection.
    #[must_use]
    pub fn collection() -> Self {
        Instance {
            fields: Map::new(),
            elements: Some(Vec::new()),
        }
    }
}

type Factory = Arc<dyn Fn(Arguments) -> Result<Instance> + Send + Sync>;

/// Registration of one named type.
#[derive(Clone)]
pub struct TypeDef {
    name: String,
    members: Vec<Member>,
    defaults: Map,
    collection: bool,
    factory: Option<Factory>,
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("members", &self.members)
            .field("defaults", &self.defaults)
            .field("collection", &self.collection)
            .field("factory", &self.factory.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl TypeDef {
    #[must_use]
    pub fn new(name: &str) -> Self {
        TypeDef {
            name: name.to_string(),
            members: Vec::new(),
            defaults: Map::new(),
            collection: false,
            factory: None,
        }
    }

    /// Declares a read/write member backed by `field`. Members are emitted in
    /// declaration order.
    #[must_use]
    pub fn member(mut self, name: &str, field: &str) -> Self {
        self.members.push(Member::new(name, field));
        self
    }

    /// Sets the initial value of an own field.
    ///
    /// Defaults are copied into every instance, so they should be scalars.
    #[must_use]
    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.defaults.insert(name.to_string(), value);
        self
    }

    /// Marks the type as a collection: instances carry elements.
    #[must_use]
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Replaces the default construction with a custom factory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_jsonpp::{Arguments, Error, Instance, TypeDef, Value};
    ///
    /// let def = TypeDef::new("Celsius").member("degrees", "k").factory(|args| {
    ///     let Arguments::Positional(values) = args else {
    ///         return Err(Error::custom("expected positional arguments"));
    ///     };
    ///     let degrees = values.first().and_then(Value::as_f64).unwrap_or(0.0);
    ///     let mut instance = Instance::new();
    ///     instance.fields.insert("k".to_string(), Value::from(degrees + 273.15));
    ///     Ok(instance)
    /// });
    /// assert_eq!(def.name(), "Celsius");
    /// ```
    #[must_use]
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    /// Runs the factory and wraps its result as a tagged value.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the factory rejects the arguments.
    pub fn construct(&self, args: Arguments) -> Result<Tagged> {
        let instance = match &self.factory {
            Some(factory) => factory(args).map_err(|e| match e {
                Error::Construction { .. } => e,
                other => Error::construction(&self.name, other),
            })?,
            None => self.default_instance(args)?,
        };

        let elements = match instance.elements {
            None if self.collection => Some(Vec::new()),
            elements => elements,
        };

        Ok(Tagged {
            tag: self.name.clone(),
            fields: instance.fields,
            elements,
            members: self.members.clone(),
            registered: true,
        })
    }

    fn default_instance(&self, args: Arguments) -> Result<Instance> {
        let mut fields = self.defaults.clone();
        let mut elements = self.collection.then(Vec::new);

        match args {
            Arguments::Named(map) => {
                for (key, value) in map {
                    let field = self
                        .members
                        .iter()
                        .find(|m| m.name == key)
                        .map_or(key, |m| m.field.clone());
                    fields.insert(field, value);
                }
            }
            Arguments::Positional(values) => match elements.as_mut() {
                Some(items) => items.extend(values),
                None => {
                    if values.len() > self.members.len() {
                        return Err(Error::construction(
                            &self.name,
                            format!(
                                "expected at most {} positional arguments, found {}",
                                self.members.len(),
                                values.len()
                            ),
                        ));
                    }
                    for (member, value) in self.members.iter().zip(values) {
                        fields.insert(member.field.clone(), value);
                    }
                }
            },
        }

        Ok(Instance { fields, elements })
    }
}

/// Caller-owned mapping from type tag to [`TypeDef`].
///
/// The engine only reads the registry, so one registry can serve any number
/// of concurrent parse calls.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: IndexMap<String, TypeDef>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type, replacing any earlier registration under the same name.
    pub fn register(&mut self, def: TypeDef) -> &mut Self {
        self.types.insert(def.name.clone(), def);
        self
    }

    /// Builder form of [`Registry::register`].
    #[must_use]
    pub fn with(mut self, def: TypeDef) -> Self {
        self.register(def);
        self
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&TypeDef> {
        self.types.get(tag)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
