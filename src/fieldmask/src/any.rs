// Copyright 2024 Google LLC
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

use crate::codec::{record_from_json, record_to_json};
use crate::{Record, RecordType, Struct, TypeRef};
use std::collections::HashMap;
use std::sync::Arc;

/// `Any` contains an arbitrary serialized record along with a URL that
/// describes the type of the serialized record.
///
/// # JSON
///
/// The JSON representation of an `Any` value uses the regular representation
/// of the embedded record, with an additional field `@type` which contains
/// the type URL. Example:
///
/// ```norust
///     {
///       "@type": "type.googleapis.com/google.profile.Person",
///       "FirstName": <string>,
///       "LastName": <string>
///     }
/// ```
///
/// The copy functions decode the payload with a [TypeRegistry], copy the
/// selected fields, and encode the result back into the destination `Any`.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Any(Struct);

/// Indicates a problem trying to use an [Any].
#[derive(thiserror::Error, Debug)]
pub enum AnyError {
    /// Problem serializing an object into an [Any].
    #[error("cannot serialize object into an Any, source={0:?}")]
    SerializationError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Problem deserializing an object from an [Any].
    #[error("cannot deserialize from an Any, source={0:?}")]
    DeserializationError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The type URL in the [Any] is not in the [TypeRegistry].
    #[error("unknown type in Any deserialization type={0}")]
    UnknownTypeError(String),
}

type Error = AnyError;

impl Any {
    /// Creates a new [Any] holding a copy of `record`.
    ///
    /// The type URL is [RecordType::type_url].
    pub fn from_record(record: &Record) -> Self {
        let mut map = record_to_json(record);
        map.insert(
            "@type".to_string(),
            serde_json::Value::String(record.record_type().type_url()),
        );
        Any(map)
    }

    /// Creates a new [Any] from its JSON representation.
    ///
    /// Fails if the value is not a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Any(map)),
            _ => Err(Error::SerializationError(Box::from(
                "unexpected JSON type, only Object is supported",
            ))),
        }
    }

    pub(crate) fn from_payload(map: Struct) -> Self {
        Any(map)
    }

    pub(crate) fn payload(&self) -> &Struct {
        &self.0
    }

    /// The type URL, if any.
    pub fn type_url(&self) -> Option<&str> {
        self.0
            .get("@type")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Returns true if the `Any` holds no type and no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extracts (if possible) the record stored in the [Any].
    pub fn to_record(&self, registry: &TypeRegistry) -> Result<Record, Error> {
        let url = crate::codec::type_url(&self.0)?;
        self.to_record_as(url, registry)
    }

    /// Decodes the payload as a record of the type registered for `type_url`.
    ///
    /// Ignores the `@type` field stored in the [Any], if any.
    pub(crate) fn to_record_as(
        &self,
        type_url: &str,
        registry: &TypeRegistry,
    ) -> Result<Record, Error> {
        let ty = registry
            .resolve(type_url)
            .ok_or_else(|| Error::UnknownTypeError(type_url.to_string()))?;
        record_from_json(ty, &self.0, registry)
    }
}

/// Implement [`serde`](::serde) serialization for [Any].
impl serde::ser::Serialize for Any {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serde::ser::Serialize::serialize(&self.0, serializer)
    }
}

/// Implement [`serde`](::serde) deserialization for [Any].
impl<'de> serde::de::Deserialize<'de> for Any {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <Struct as serde::de::Deserialize>::deserialize(deserializer)?;
        Ok(Any(value))
    }
}

/// Maps type URLs to record types.
///
/// Decoding an [Any] requires the type of its payload. Register every type
/// that may appear in an [Any] and pass the registry to
/// [CopyOptions::set_registry][crate::CopyOptions::set_registry].
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::*;
/// # use std::sync::Arc;
/// let image = Arc::new(RecordType::builder("test.Image").field("Url", Shape::String).build());
/// let registry = TypeRegistry::new().register(image.clone());
/// let found = registry.resolve("type.googleapis.com/test.Image");
/// assert!(found.is_some_and(|t| Arc::ptr_eq(&t, &image)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeRef>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type, keyed by its [type URL][RecordType::type_url].
    pub fn register<T: Into<TypeRef>>(mut self, ty: T) -> Self {
        let ty = ty.into();
        self.types.insert(ty.get().type_url(), ty);
        self
    }

    /// Finds the type registered for `type_url`.
    pub fn resolve(&self, type_url: &str) -> Option<Arc<RecordType>> {
        self.types.get(type_url).map(TypeRef::get)
    }
}
