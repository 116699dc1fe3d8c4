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

use crate::copy::{check_known_fields, root_record};
use crate::error::Error;
use crate::options::CopyOptions;
use crate::{FieldFilter, Kind, Record, Shape, Struct, Value, to_json};
use serde_json::Value as Json;

/// Copies the fields selected by `filter` from `src` into a JSON object.
///
/// `src` must be a [Record], or a (non-`nil`) [Pointer][crate::Pointer] or
/// [Interface][crate::Interface] holding one. Each selected field is written under its name, or the name given by
/// the [destination tag][CopyOptions::set_destination_tag]:
///
/// * Records, and pointers or interfaces holding records, become nested
///   objects. An object already present under the key is updated in place.
/// * `nil` pointers and interfaces become `null`.
/// * Lists and arrays of records become arrays of objects. Existing objects in
///   the array are updated in place, and the array is truncated or grown to
///   the length of the source.
/// * Lists and arrays of scalars, maps, and scalars are written as JSON values.
///
/// Fields not selected by the filter keep their value in `dst`. Use a
/// [FieldVisitor][crate::options::FieldVisitor] to customize the output for
/// some fields.
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::*;
/// # use std::sync::Arc;
/// let image = Arc::new(
///     RecordType::builder("Image")
///         .add_field(FieldDescriptor::new("OriginalUrl", Shape::String).set_tag("json", "original_url"))
///         .add_field(FieldDescriptor::new("ResizedUrl", Shape::String).set_tag("json", "resized_url"))
///         .build(),
/// );
/// let src = Record::new(image.clone())
///     .set("OriginalUrl", "original.jpg")?
///     .set("ResizedUrl", "resized.jpg")?;
/// let mut dst = Struct::new();
///
/// let filter = FieldFilter::from(Mask::parse("ResizedUrl")?);
/// let options = CopyOptions::new().set_destination_tag("json");
/// copy_into_mapping(&filter, &Value::from(src), &mut dst, &options)?;
/// assert_eq!(serde_json::Value::Object(dst), serde_json::json!({"resized_url": "resized.jpg"}));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn copy_into_mapping(
    filter: &FieldFilter,
    src: &Value,
    dst: &mut Struct,
    options: &CopyOptions,
) -> Result<(), Error> {
    let src = root_record(src)?;
    Mapper { options }.record(filter, src, dst, 0)
}

struct Mapper<'a> {
    options: &'a CopyOptions,
}

impl Mapper<'_> {
    fn record(
        &self,
        filter: &FieldFilter,
        src: &Record,
        dst: &mut Struct,
        depth: usize,
    ) -> Result<(), Error> {
        if depth > self.options.max_depth() {
            return Err(Error::depth_exceeded(self.options.max_depth()));
        }
        check_known_fields(filter, src, self.options)?;

        for (field, value) in src.fields() {
            let Some(sub) = filter.filter(field.name_for(self.options.source_tag())) else {
                continue;
            };
            if !field.exported() {
                continue;
            }
            let key = field.name_for(self.options.destination_tag());
            if let Some(visitor) = self.options.field_visitor() {
                let result = visitor.visit(sub, field.name(), key, value);
                if let Some(replacement) = result.replacement {
                    dst.insert(key.to_string(), replacement);
                }
                if result.skip_default {
                    continue;
                }
            }
            // Cloned so a failed call leaves the existing entry in place.
            let existing = dst.get(key).cloned();
            let updated = self
                .value(sub, value, existing, depth + 1)
                .map_err(|e| e.within(field.name()))?;
            dst.insert(key.to_string(), updated);
        }
        Ok(())
    }

    /// Converts `src`, reusing any objects in `existing`.
    fn value(
        &self,
        filter: &FieldFilter,
        src: &Value,
        existing: Option<Json>,
        depth: usize,
    ) -> Result<Json, Error> {
        match src {
            Value::Record(r) => {
                let mut object = match existing {
                    Some(Json::Object(object)) => object,
                    _ => Struct::new(),
                };
                self.record(filter, r, &mut object, depth)?;
                Ok(Json::Object(object))
            }
            Value::Pointer(p) => match p.target() {
                None => Ok(Json::Null),
                Some(target) => self.value(filter, target, existing, depth + 1),
            },
            Value::Interface(i) => match i.target() {
                None => Ok(Json::Null),
                Some(target) => self.value(filter, target, existing, depth + 1),
            },
            Value::Any(a) if a.is_empty() => Ok(Json::Null),
            Value::Any(a) => {
                let record = a
                    .to_record(self.options.registry())
                    .map_err(Error::codec)?;
                tracing::debug!(
                    "decoded Any payload with type {}",
                    record.record_type().type_url()
                );
                self.value(filter, &Value::Record(record), existing, depth + 1)
            }
            Value::List(l) => {
                let items = (!l.is_null()).then(|| l.items());
                self.sequence(filter, src, l.element(), items, existing, depth)
            }
            Value::Array(a) => {
                self.sequence(filter, src, a.element(), Some(a.items()), existing, depth)
            }
            _ => Ok(to_json(src)),
        }
    }

    fn sequence(
        &self,
        filter: &FieldFilter,
        src: &Value,
        element: &Shape,
        items: Option<&[Value]>,
        existing: Option<Json>,
        depth: usize,
    ) -> Result<Json, Error> {
        let len = self
            .options
            .sequence_len(src, items.map_or(0, |i| i.len()));
        let nested = !element.kind().is_scalar()
            && !matches!(element.kind(), Kind::List | Kind::Array | Kind::Map);
        if !nested {
            let json = items.map_or(Json::Null, |i| {
                Json::Array(i[..len].iter().map(to_json).collect())
            });
            return Ok(json);
        }

        // A nil source produces `null`, unless there are existing entries.
        let mut entries = items.map(|_| Vec::new());
        match existing {
            None | Some(Json::Null) => {}
            Some(Json::Array(array)) => {
                // `null` is written for nil elements and may be reused.
                if let Some(entry) = array.iter().find(|e| !e.is_object() && !e.is_null()) {
                    return Err(Error::structural_mismatch(format!(
                        "unexpected dst entry {entry}, expected an object or null"
                    )));
                }
                entries = Some(array);
            }
            Some(other) => {
                return Err(Error::structural_mismatch(format!(
                    "unexpected dst value {other}, expected an array of objects"
                )));
            }
        }
        let Some(mut entries) = entries else {
            return Ok(Json::Null);
        };
        if entries.len() < len {
            entries.resize_with(len, || Json::Object(Struct::new()));
        }
        for (i, item) in items.unwrap_or_default()[..len].iter().enumerate() {
            let existing = std::mem::take(&mut entries[i]);
            entries[i] = self
                .value(filter, item, Some(existing), depth + 1)
                .map_err(|e| e.within(i.to_string()))?;
        }
        entries.truncate(len);
        Ok(Json::Array(entries))
    }
}
