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

use crate::error::Error;
use crate::{Any, InterfaceType, RecordType, Shape, TypeRef};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A dynamically typed value.
///
/// The copy functions operate on trees of `Value`. Composite values carry
/// enough type information to create new elements, so the engine can allocate
/// `nil` pointers, grow lists, and instantiate the concrete type held by an
/// interface.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(bytes::Bytes),
    Record(Record),
    Pointer(Pointer),
    Interface(Interface),
    List(List),
    Array(Array),
    Map(MapValue),
    Any(Any),
}

/// The kind of a [Value] or [Shape].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    Record,
    Pointer,
    Interface,
    List,
    Array,
    Map,
    Any,
}

impl Kind {
    /// Returns true for kinds that hold a single value and no sub-fields.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::I32
                | Self::I64
                | Self::U32
                | Self::U64
                | Self::F32
                | Self::F64
                | Self::String
                | Self::Bytes
        )
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Record => "record",
            Self::Pointer => "pointer",
            Self::Interface => "interface",
            Self::List => "list",
            Self::Array => "array",
            Self::Map => "map",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::U32(_) => Kind::U32,
            Self::U64(_) => Kind::U64,
            Self::F32(_) => Kind::F32,
            Self::F64(_) => Kind::F64,
            Self::String(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::Record(_) => Kind::Record,
            Self::Pointer(_) => Kind::Pointer,
            Self::Interface(_) => Kind::Interface,
            Self::List(_) => Kind::List,
            Self::Array(_) => Kind::Array,
            Self::Map(_) => Kind::Map,
            Self::Any(_) => Kind::Any,
        }
    }

    /// The kind after following one pointer, if this is a pointer.
    pub(crate) fn pointee_kind(&self) -> Kind {
        match self {
            Self::Pointer(p) => p.pointee.kind(),
            v => v.kind(),
        }
    }

    /// The shape of this value.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Bool(_) => Shape::Bool,
            Self::I32(_) => Shape::I32,
            Self::I64(_) => Shape::I64,
            Self::U32(_) => Shape::U32,
            Self::U64(_) => Shape::U64,
            Self::F32(_) => Shape::F32,
            Self::F64(_) => Shape::F64,
            Self::String(_) => Shape::String,
            Self::Bytes(_) => Shape::Bytes,
            Self::Record(r) => Shape::Record(TypeRef::Resolved(r.ty.clone())),
            Self::Pointer(p) => Shape::pointer(p.pointee.clone()),
            Self::Interface(i) => Shape::Interface(i.ty.clone()),
            Self::List(l) => Shape::list(l.element.clone()),
            Self::Array(a) => Shape::array(a.element.clone(), a.items.len()),
            Self::Map(m) => Shape::map(m.value.clone()),
            Self::Any(_) => Shape::Any,
        }
    }

    /// Resets the value to the zero value of its shape.
    pub fn clear(&mut self) {
        *self = self.shape().zero();
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&Pointer> {
        match self {
            Self::Pointer(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Interface> {
        match self {
            Self::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_any(&self) -> Option<&Any> {
        match self {
            Self::Any(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    bytes::Bytes => Bytes,
    Record => Record,
    Pointer => Pointer,
    Interface => Interface,
    List => List,
    Array => Array,
    MapValue => Map,
    Any => Any,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A record: a fixed set of named fields, described by a [RecordType].
#[derive(Clone)]
pub struct Record {
    ty: Arc<RecordType>,
    values: Vec<Value>,
}

impl Record {
    /// Creates a record where every field holds its zero value.
    pub fn new(ty: Arc<RecordType>) -> Self {
        let values = ty.fields().iter().map(|f| f.shape().zero()).collect();
        Self { ty, values }
    }

    /// The type of this record.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    /// Sets the value of a field.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_fieldmask::*;
    /// # use std::sync::Arc;
    /// let ty = Arc::new(RecordType::builder("Image").field("Url", Shape::String).build());
    /// let image = Record::new(ty).set("Url", "a.jpg")?;
    /// assert_eq!(image.get("Url").and_then(Value::as_str), Some("a.jpg"));
    /// assert!(image.clone().set("Url", 42).is_err());
    /// assert!(image.set("Size", 42).is_err());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn set<N: AsRef<str>, V: Into<Value>>(mut self, name: N, value: V) -> Result<Self, Error> {
        self.put(name.as_ref(), value.into())?;
        Ok(self)
    }

    /// Replaces the value of a field in place.
    pub fn put(&mut self, name: &str, value: Value) -> Result<(), Error> {
        let Some((i, field)) = self.ty.field(name) else {
            return Err(Error::unwritable(format!(
                "record {} has no field {name}",
                self.ty.name()
            )));
        };
        if !field.shape().accepts(&value) {
            return Err(Error::structural_mismatch(format!(
                "cannot store a {} in field {name} of kind {}",
                value.kind(),
                field.shape().kind()
            )));
        }
        self.values[i] = value;
        Ok(())
    }

    /// The value of a field, or `None` if the record type has no such field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.ty.field(name).map(|(i, _)| &self.values[i])
    }

    /// Iterates over the field descriptors and values, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&crate::FieldDescriptor, &Value)> {
        self.ty.fields().iter().zip(self.values.iter())
    }

    pub(crate) fn value_at_mut(&mut self, index: usize) -> &mut Value {
        &mut self.values[index]
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct(self.ty.name());
        for (field, value) in self.fields() {
            s.field(field.name(), value);
        }
        s.finish()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ty, &other.ty) && self.values == other.values
    }
}

/// An optional reference to a value.
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    pointee: Shape,
    target: Option<Box<Value>>,
}

impl Pointer {
    /// A `nil` pointer to values of shape `pointee`.
    pub fn null(pointee: Shape) -> Self {
        Self {
            pointee,
            target: None,
        }
    }

    /// A pointer to `value`.
    pub fn to<V: Into<Value>>(value: V) -> Self {
        let value = value.into();
        Self {
            pointee: value.shape(),
            target: Some(Box::new(value)),
        }
    }

    pub(crate) fn new(pointee: Shape, target: Option<Value>) -> Self {
        Self {
            pointee,
            target: target.map(Box::new),
        }
    }

    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }

    /// The shape of the values this pointer refers to.
    pub fn pointee(&self) -> &Shape {
        &self.pointee
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_deref()
    }

    pub fn target_mut(&mut self) -> Option<&mut Value> {
        self.target.as_deref_mut()
    }

    /// Returns the target, allocating a zero value if the pointer is `nil`.
    pub(crate) fn target_or_alloc(&mut self) -> &mut Value {
        self.target
            .get_or_insert_with(|| Box::new(self.pointee.zero()))
            .as_mut()
    }
}

impl From<Pointer> for Option<Value> {
    fn from(value: Pointer) -> Self {
        value.target.map(|b| *b)
    }
}

/// A polymorphic box, holding `nil` or a value whose type implements an
/// [InterfaceType].
///
/// The concrete value is usually a [Pointer] to a [Record].
#[derive(Clone, Debug, PartialEq)]
pub struct Interface {
    ty: Arc<InterfaceType>,
    target: Option<Box<Value>>,
}

impl Interface {
    /// An empty (`nil`) box.
    pub fn null(ty: Arc<InterfaceType>) -> Self {
        Self { ty, target: None }
    }

    /// A box holding `value`.
    pub fn new<V: Into<Value>>(ty: Arc<InterfaceType>, value: V) -> Self {
        Self {
            ty,
            target: Some(Box::new(value.into())),
        }
    }

    pub fn interface_type(&self) -> &Arc<InterfaceType> {
        &self.ty
    }

    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_deref()
    }

    pub fn target_mut(&mut self) -> Option<&mut Value> {
        self.target.as_deref_mut()
    }

    pub(crate) fn set_target(&mut self, value: Option<Value>) {
        self.target = value.map(Box::new);
    }
}

/// A variable-length sequence, which may be `nil`.
///
/// A `nil` list and an empty list are different values.
#[derive(Clone, Debug, PartialEq)]
pub struct List {
    element: Shape,
    items: Option<Vec<Value>>,
}

impl List {
    /// A `nil` list.
    pub fn null(element: Shape) -> Self {
        Self {
            element,
            items: None,
        }
    }

    /// A list with the given items.
    pub fn new<I, V>(element: Shape, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            element,
            items: Some(items.into_iter().map(|v| v.into()).collect()),
        }
    }

    pub fn is_null(&self) -> bool {
        self.items.is_none()
    }

    /// The shape of the list elements.
    pub fn element(&self) -> &Shape {
        &self.element
    }

    /// The items, an empty slice for `nil` lists.
    pub fn items(&self) -> &[Value] {
        self.items.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub(crate) fn items_mut(&mut self) -> &mut Option<Vec<Value>> {
        &mut self.items
    }
}

/// A fixed-length sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    element: Shape,
    items: Vec<Value>,
}

impl Array {
    /// An array of `len` zero values.
    pub fn zero(element: Shape, len: usize) -> Self {
        let items = (0..len).map(|_| element.zero()).collect();
        Self { element, items }
    }

    /// An array with the given items. Its length is the number of items.
    pub fn new<I, V>(element: Shape, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            element,
            items: items.into_iter().map(|v| v.into()).collect(),
        }
    }

    /// The shape of the array elements.
    pub fn element(&self) -> &Shape {
        &self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Value] {
        &mut self.items
    }
}

/// A string-keyed map, which may be `nil`.
#[derive(Clone, Debug, PartialEq)]
pub struct MapValue {
    value: Shape,
    entries: Option<BTreeMap<String, Value>>,
}

impl MapValue {
    /// A `nil` map.
    pub fn null(value: Shape) -> Self {
        Self {
            value,
            entries: None,
        }
    }

    /// A map with the given entries.
    pub fn new<I, K, V>(value: Shape, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            value,
            entries: Some(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        self.entries.is_none()
    }

    /// The shape of the map values.
    pub fn value_shape(&self) -> &Shape {
        &self.value
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.as_ref().and_then(|e| e.get(key))
    }

    /// Iterates over the entries, in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter().flat_map(|e| e.iter())
    }
}
