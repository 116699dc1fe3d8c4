// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{Any, Array, Interface, Kind, List, MapValue, Pointer, Record, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// The static type of a record field, or of the elements in a collection.
///
/// The copy engine uses shapes to create new values, for example, when a
/// `nil` destination pointer must be allocated, or a destination list must
/// grow.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    /// A record of the given type.
    Record(TypeRef),
    /// An optional reference to a value of the given shape.
    Pointer(Box<Shape>),
    /// A polymorphic box, holding any record that implements the interface.
    Interface(Arc<InterfaceType>),
    /// A variable-length sequence.
    List(Box<Shape>),
    /// A fixed-length sequence.
    Array(Box<Shape>, usize),
    /// A string-keyed map. Maps are always copied as a whole.
    Map(Box<Shape>),
    /// A dynamically typed message, see [Any].
    Any,
}

impl Shape {
    /// A record of the given type.
    pub fn record(ty: &Arc<RecordType>) -> Self {
        Self::Record(TypeRef::Resolved(ty.clone()))
    }

    /// A record whose type is provided by a function.
    ///
    /// Use this for recursive types, see [TypeRef::Deferred].
    pub fn deferred(ty: fn() -> Arc<RecordType>) -> Self {
        Self::Record(TypeRef::Deferred(ty))
    }

    /// A pointer to `pointee`.
    pub fn pointer(pointee: Shape) -> Self {
        Self::Pointer(Box::new(pointee))
    }

    /// A polymorphic box for the given interface.
    pub fn interface(ty: &Arc<InterfaceType>) -> Self {
        Self::Interface(ty.clone())
    }

    /// A list of `element`.
    pub fn list(element: Shape) -> Self {
        Self::List(Box::new(element))
    }

    /// An array of `len` elements.
    pub fn array(element: Shape, len: usize) -> Self {
        Self::Array(Box::new(element), len)
    }

    /// A map with string keys and values of shape `value`.
    pub fn map(value: Shape) -> Self {
        Self::Map(Box::new(value))
    }

    /// The kind of values with this shape.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::I32 => Kind::I32,
            Self::I64 => Kind::I64,
            Self::U32 => Kind::U32,
            Self::U64 => Kind::U64,
            Self::F32 => Kind::F32,
            Self::F64 => Kind::F64,
            Self::String => Kind::String,
            Self::Bytes => Kind::Bytes,
            Self::Record(_) => Kind::Record,
            Self::Pointer(_) => Kind::Pointer,
            Self::Interface(_) => Kind::Interface,
            Self::List(_) => Kind::List,
            Self::Array(_, _) => Kind::Array,
            Self::Map(_) => Kind::Map,
            Self::Any => Kind::Any,
        }
    }

    /// Creates the zero value for this shape.
    ///
    /// Scalars are zero or empty, pointers, interfaces, lists and maps are
    /// `nil`. Arrays and records contain the zero value for each element.
    pub fn zero(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::String => Value::String(String::new()),
            Self::Bytes => Value::Bytes(bytes::Bytes::new()),
            Self::Record(ty) => Value::Record(Record::new(ty.get())),
            Self::Pointer(pointee) => Value::Pointer(Pointer::null(pointee.as_ref().clone())),
            Self::Interface(ty) => Value::Interface(Interface::null(ty.clone())),
            Self::List(element) => Value::List(List::null(element.as_ref().clone())),
            Self::Array(element, len) => Value::Array(Array::zero(element.as_ref().clone(), *len)),
            Self::Map(value) => Value::Map(MapValue::null(value.as_ref().clone())),
            Self::Any => Value::Any(Any::default()),
        }
    }

    /// Returns true if `value` can be stored in a slot of this shape.
    pub(crate) fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Record(ty), Value::Record(r)) => Arc::ptr_eq(&ty.get(), r.record_type()),
            _ => self.kind() == value.kind(),
        }
    }
}

/// A reference to a [RecordType].
///
/// Records may refer to themselves, directly or indirectly, through pointers,
/// lists, or interfaces. Such types cannot be built as a tree of `Arc`
/// values. Instead, define the type in a `static` and refer to it through a
/// function:
///
/// ```
/// # use google_cloud_fieldmask::*;
/// # use std::sync::{Arc, LazyLock};
/// fn node() -> Arc<RecordType> {
///     static TYPE: LazyLock<Arc<RecordType>> = LazyLock::new(|| {
///         Arc::new(
///             RecordType::builder("Node")
///                 .field("Value", Shape::I64)
///                 .field("Children", Shape::list(Shape::pointer(Shape::deferred(node))))
///                 .build(),
///         )
///     });
///     TYPE.clone()
/// }
/// let root = Record::new(node());
/// assert_eq!(root.get("Value"), Some(&Value::I64(0)));
/// ```
#[derive(Clone)]
pub enum TypeRef {
    /// The type is known.
    Resolved(Arc<RecordType>),
    /// The type is returned by a function, typically reading a `static`.
    Deferred(fn() -> Arc<RecordType>),
}

impl TypeRef {
    /// Returns the referenced type.
    pub fn get(&self) -> Arc<RecordType> {
        match self {
            Self::Resolved(ty) => ty.clone(),
            Self::Deferred(f) => f(),
        }
    }
}

impl std::fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Printing the fields could recurse forever.
        f.debug_tuple("TypeRef").field(&self.get().name()).finish()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.get(), &other.get())
    }
}

impl From<Arc<RecordType>> for TypeRef {
    fn from(value: Arc<RecordType>) -> Self {
        Self::Resolved(value)
    }
}

/// Describes the fields of a record type.
///
/// The descriptor is built once per type, and shared by all the records of
/// that type. Two records have the same type only if they share the same
/// descriptor.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    type_url: Option<String>,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    capabilities: BTreeSet<String>,
}

impl RecordType {
    /// Starts building a new record type.
    pub fn builder<T: Into<String>>(name: T) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            type_url: None,
            fields: Vec::new(),
            capabilities: BTreeSet::new(),
        }
    }

    /// The name of the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type URL used when records of this type are stored in an [Any].
    ///
    /// Defaults to `type.googleapis.com/{name}`.
    pub fn type_url(&self) -> String {
        self.type_url
            .clone()
            .unwrap_or_else(|| format!("type.googleapis.com/{}", self.name))
    }

    /// The fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Finds a field by name, returning its position and descriptor.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.index.get(name).map(|i| (*i, &self.fields[*i]))
    }

    /// The names of the capabilities (methods) implemented by this type.
    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    /// Returns true if this type implements all the capabilities required by
    /// `interface`.
    pub fn implements(&self, interface: &InterfaceType) -> bool {
        interface.required.is_subset(&self.capabilities)
    }
}

/// Builds [RecordType] descriptors.
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    type_url: Option<String>,
    fields: Vec<FieldDescriptor>,
    capabilities: BTreeSet<String>,
}

impl RecordTypeBuilder {
    /// Adds an exported, untagged field.
    pub fn field<T: Into<String>>(self, name: T, shape: Shape) -> Self {
        self.add_field(FieldDescriptor::new(name, shape))
    }

    /// Adds a field described by `field`.
    ///
    /// If a field with the same name already exists it is replaced.
    pub fn add_field(mut self, field: FieldDescriptor) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Overrides the type URL, see [RecordType::type_url].
    pub fn type_url<T: Into<String>>(mut self, url: T) -> Self {
        self.type_url = Some(url.into());
        self
    }

    /// Declares a capability (method) implemented by the type.
    pub fn capability<T: Into<String>>(mut self, name: T) -> Self {
        self.capabilities.insert(name.into());
        self
    }

    /// Creates the descriptor.
    pub fn build(self) -> RecordType {
        let index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        RecordType {
            name: self.name,
            type_url: self.type_url,
            fields: self.fields,
            index,
            capabilities: self.capabilities,
        }
    }
}

/// Describes a single field in a [RecordType].
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    shape: Shape,
    exported: bool,
    tags: BTreeMap<String, String>,
}

impl FieldDescriptor {
    /// Creates an exported field without tags.
    pub fn new<T: Into<String>>(name: T, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            exported: true,
            tags: BTreeMap::new(),
        }
    }

    /// Changes whether the field is exported.
    ///
    /// Unexported fields are never copied individually. They are only copied
    /// as part of a whole record.
    pub fn set_exported(mut self, v: bool) -> Self {
        self.exported = v;
        self
    }

    /// Adds a tag.
    ///
    /// Tags are alternative names for the field, e.g. a `json` name or a
    /// database column name. The tag value may contain options after the
    /// name, separated by commas, such as `display_name,omitempty`.
    pub fn set_tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns true if the field is exported.
    pub fn exported(&self) -> bool {
        self.exported
    }

    /// The full value of the tag named `key`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// The name for this field under the given tag key.
    ///
    /// Returns the tag value up to its first comma. Falls back to the field
    /// name if `key` is `None`, the field has no such tag, or the tag does not
    /// start with a name.
    pub fn name_for(&self, key: Option<&str>) -> &str {
        key.and_then(|k| self.tag(k))
            .map(|t| t.split_once(',').map_or(t, |(name, _)| name))
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Describes the capabilities required by a polymorphic box.
///
/// A record can be stored in an [Interface] if its type implements all the
/// capabilities listed here. The interface name plays no role in this check,
/// two interfaces with the same capabilities are interchangeable.
#[derive(Debug, PartialEq, Eq)]
pub struct InterfaceType {
    name: String,
    required: BTreeSet<String>,
}

impl InterfaceType {
    /// Creates a new interface type.
    pub fn new<T, I, V>(name: T, required: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            required: required.into_iter().map(|v| v.into()).collect(),
        }
    }

    /// The name of the interface.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The capabilities required by the interface.
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }
}
