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

//! Converts [Value] trees to and from JSON.
//!
//! [Any] payloads are stored as JSON objects, and the mapping copy writes
//! JSON values. Records become objects keyed by field name, with every field
//! present. Bytes use standard base64. Integers and finite floats are JSON
//! numbers, non-finite floats become `null`.
//!
//! A record held by an [Interface] is written with an extra `@type` field, so
//! the concrete type can be found again when decoding.

use crate::{Any, AnyError, Array, Interface, List, MapValue, Pointer, Record, RecordType};
use crate::{Shape, Struct, TypeRegistry, Value};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as Json;
use std::sync::Arc;

const TYPE_FIELD: &str = "@type";

/// Encodes `value` as JSON.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Bool(v) => Json::Bool(*v),
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::F32(v) => float(*v as f64),
        Value::F64(v) => float(*v),
        Value::String(v) => Json::String(v.clone()),
        Value::Bytes(v) => Json::String(STANDARD.encode(v)),
        Value::Record(r) => Json::Object(record_to_json(r)),
        Value::Pointer(p) => p.target().map(to_json).unwrap_or(Json::Null),
        Value::Interface(i) => i.target().map(typed_json).unwrap_or(Json::Null),
        Value::List(l) if l.is_null() => Json::Null,
        Value::List(l) => Json::Array(l.items().iter().map(to_json).collect()),
        Value::Array(a) => Json::Array(a.items().iter().map(to_json).collect()),
        Value::Map(m) if m.is_null() => Json::Null,
        Value::Map(m) => Json::Object(m.entries().map(|(k, v)| (k.clone(), to_json(v))).collect()),
        Value::Any(a) => Json::Object(a.payload().clone()),
    }
}

/// Encodes every field of `record` into a JSON object.
pub(crate) fn record_to_json(record: &Record) -> Struct {
    record
        .fields()
        .map(|(f, v)| (f.name().to_string(), to_json(v)))
        .collect()
}

fn typed_json(value: &Value) -> Json {
    let record = match value {
        Value::Record(r) => Some(r),
        Value::Pointer(p) => p.target().and_then(Value::as_record),
        _ => None,
    };
    match (to_json(value), record) {
        (Json::Object(mut map), Some(r)) => {
            map.insert(TYPE_FIELD.to_string(), Json::String(r.record_type().type_url()));
            Json::Object(map)
        }
        (json, _) => json,
    }
}

fn float(v: f64) -> Json {
    serde_json::Number::from_f64(v)
        .map(Json::Number)
        .unwrap_or(Json::Null)
}

/// Decodes a JSON value into a [Value] of the given shape.
///
/// `null` decodes to the zero value of any shape. Records held by interfaces
/// must carry a `@type` field, which is resolved using `registry`.
pub fn from_json(shape: &Shape, json: &Json, registry: &TypeRegistry) -> Result<Value, AnyError> {
    if json.is_null() {
        return Ok(shape.zero());
    }
    let value = match shape {
        Shape::Bool => Value::Bool(json.as_bool().ok_or_else(|| mismatch(shape, json))?),
        Shape::I32 => Value::I32(integer(shape, json)?),
        Shape::I64 => Value::I64(integer(shape, json)?),
        Shape::U32 => Value::U32(integer(shape, json)?),
        Shape::U64 => Value::U64(integer(shape, json)?),
        Shape::F32 => Value::F32(json.as_f64().ok_or_else(|| mismatch(shape, json))? as f32),
        Shape::F64 => Value::F64(json.as_f64().ok_or_else(|| mismatch(shape, json))?),
        Shape::String => Value::String(string(shape, json)?.to_string()),
        Shape::Bytes => {
            let bytes = STANDARD
                .decode(string(shape, json)?)
                .map_err(|e| AnyError::DeserializationError(e.into()))?;
            Value::Bytes(bytes.into())
        }
        Shape::Record(ty) => {
            Value::Record(record_from_json(ty.get(), object(shape, json)?, registry)?)
        }
        Shape::Pointer(pointee) => {
            let target = from_json(pointee, json, registry)?;
            Value::Pointer(Pointer::new(pointee.as_ref().clone(), Some(target)))
        }
        Shape::Interface(ty) => {
            let map = object(shape, json)?;
            let url = type_url(map)?;
            let concrete = registry
                .resolve(url)
                .ok_or_else(|| AnyError::UnknownTypeError(url.to_string()))?;
            let record = record_from_json(concrete, map, registry)?;
            Value::Interface(Interface::new(ty.clone(), Pointer::to(record)))
        }
        Shape::List(element) => {
            let items = array(shape, json)?
                .iter()
                .map(|v| from_json(element, v, registry))
                .collect::<Result<Vec<_>, _>>()?;
            Value::List(List::new(element.as_ref().clone(), items))
        }
        Shape::Array(element, len) => {
            let items = array(shape, json)?;
            if items.len() > *len {
                return Err(deserialization(format!(
                    "expected at most {len} elements, got {}",
                    items.len()
                )));
            }
            let mut decoded = Array::zero(element.as_ref().clone(), *len);
            for (slot, v) in decoded.items_mut().iter_mut().zip(items) {
                *slot = from_json(element, v, registry)?;
            }
            Value::Array(decoded)
        }
        Shape::Map(value) => {
            let entries = object(shape, json)?
                .iter()
                .map(|(k, v)| Ok((k.clone(), from_json(value, v, registry)?)))
                .collect::<Result<Vec<_>, AnyError>>()?;
            Value::Map(MapValue::new(value.as_ref().clone(), entries))
        }
        Shape::Any => Value::Any(Any::from_payload(object(shape, json)?.clone())),
    };
    Ok(value)
}

/// Decodes a JSON object into a record of type `ty`.
///
/// Fields missing from the object keep their zero value. A `@type` field is
/// ignored, any other unknown field is an error.
pub(crate) fn record_from_json(
    ty: Arc<RecordType>,
    map: &Struct,
    registry: &TypeRegistry,
) -> Result<Record, AnyError> {
    let mut record = Record::new(ty);
    for (name, json) in map.iter().filter(|(k, _)| k.as_str() != TYPE_FIELD) {
        let Some((index, field)) = record.record_type().field(name) else {
            return Err(deserialization(format!(
                "unknown field {name} in {}",
                record.record_type().name()
            )));
        };
        let value = from_json(field.shape(), json, registry)?;
        *record.value_at_mut(index) = value;
    }
    Ok(record)
}

pub(crate) fn type_url(map: &Struct) -> Result<&str, AnyError> {
    map.get(TYPE_FIELD)
        .and_then(Json::as_str)
        .ok_or_else(|| deserialization("@type field is missing or is not a string"))
}

fn integer<T>(shape: &Shape, json: &Json) -> Result<T, AnyError>
where
    T: TryFrom<i64> + TryFrom<u64> + std::str::FromStr,
{
    let got = match json {
        Json::Number(n) => n
            .as_i64()
            .and_then(|v| T::try_from(v).ok())
            .or_else(|| n.as_u64().and_then(|v| T::try_from(v).ok())),
        // 64-bit integers are often encoded as strings.
        Json::String(s) => s.parse::<T>().ok(),
        _ => None,
    };
    got.ok_or_else(|| mismatch(shape, json))
}

fn string<'a>(shape: &Shape, json: &'a Json) -> Result<&'a str, AnyError> {
    json.as_str().ok_or_else(|| mismatch(shape, json))
}

fn object<'a>(shape: &Shape, json: &'a Json) -> Result<&'a Struct, AnyError> {
    json.as_object().ok_or_else(|| mismatch(shape, json))
}

fn array<'a>(shape: &Shape, json: &'a Json) -> Result<&'a Vec<Json>, AnyError> {
    json.as_array().ok_or_else(|| mismatch(shape, json))
}

fn mismatch(shape: &Shape, json: &Json) -> AnyError {
    deserialization(format!("cannot decode {json} as a {}", shape.kind()))
}

fn deserialization<T: Into<String>>(msg: T) -> AnyError {
    AnyError::DeserializationError(msg.into().into())
}
