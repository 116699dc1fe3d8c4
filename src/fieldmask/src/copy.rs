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
use crate::options::CopyOptions;
use crate::{Any, Array, FieldFilter, Interface, Kind, List, Pointer, Record, Shape, Value};
use std::sync::Arc;

/// Copies the fields selected by `filter` from `src` into `dst`.
///
/// `src` must be a [Record], or a (non-`nil`) [Pointer] or [Interface] holding
/// one. `dst` must be a [Record] or a [Pointer] to one, which is allocated if
/// needed. The source and destination do not need to have the same type, only
/// compatible fields: for each selected field in the source, the destination
/// must have a field with the same name (or the name given by the
/// [destination tag][CopyOptions::set_destination_tag]) and kind.
///
/// Fields that are not selected keep their value in `dst`. Nested records,
/// pointers, interfaces, lists and arrays are copied recursively, using the
/// sub-filter for the field. Lists are truncated or grown to the length of the
/// source. Maps and scalars are assigned.
///
/// On error, `dst` may have been partially updated.
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::*;
/// # use std::sync::Arc;
/// let image = Arc::new(
///     RecordType::builder("Image")
///         .field("OriginalUrl", Shape::String)
///         .field("ResizedUrl", Shape::String)
///         .build(),
/// );
/// let user = Arc::new(
///     RecordType::builder("User")
///         .field("Id", Shape::U32)
///         .field("Avatar", Shape::pointer(Shape::record(&image)))
///         .build(),
/// );
/// let src = Record::new(user.clone())
///     .set("Id", 42_u32)?
///     .set("Avatar", Pointer::to(Record::new(image.clone()).set("OriginalUrl", "a.jpg")?))?;
/// let mut dst = Value::from(Record::new(user.clone()));
///
/// let filter = FieldFilter::from(InverseMask::parse("Id")?);
/// copy_into(&filter, &Value::from(src), &mut dst, &CopyOptions::new())?;
///
/// let dst = dst.as_record().unwrap();
/// assert_eq!(dst.get("Id"), Some(&Value::U32(0)));
/// let avatar = dst.get("Avatar").and_then(Value::as_pointer).and_then(Pointer::target);
/// let url = avatar.and_then(Value::as_record).and_then(|a| a.get("OriginalUrl"));
/// assert_eq!(url, Some(&Value::from("a.jpg")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn copy_into(
    filter: &FieldFilter,
    src: &Value,
    dst: &mut Value,
    options: &CopyOptions,
) -> Result<(), Error> {
    let src = root_record(src)?;
    if dst.pointee_kind() != Kind::Record {
        return Err(Error::structural_mismatch(format!(
            "dst kind must be a record, {} given",
            dst.pointee_kind()
        )));
    }
    let copier = Copier { options };
    copier.record(filter, src, deref(dst), 0)
}

/// In strict mode, verifies that every field named by `filter` exists in `src`.
pub(crate) fn check_known_fields(
    filter: &FieldFilter,
    src: &Record,
    options: &CopyOptions,
) -> Result<(), Error> {
    if !options.strict() {
        return Ok(());
    }
    let source_tag = options.source_tag();
    match filter
        .included_names()
        .find(|n| !src.fields().any(|(f, _)| f.name_for(source_tag) == *n))
    {
        None => Ok(()),
        Some(name) => Err(Error::unknown_field(format!(
            "field {name} not found in src record {}",
            src.record_type().name()
        ))),
    }
}

pub(crate) fn root_record(src: &Value) -> Result<&Record, Error> {
    match src {
        Value::Record(r) => Ok(r),
        Value::Pointer(p) => match p.target() {
            Some(v) => root_record(v),
            None => Err(Error::structural_mismatch("src must not be a nil pointer")),
        },
        Value::Interface(i) => match i.target() {
            Some(v) => root_record(v),
            None => Err(Error::structural_mismatch("src must not be a nil interface")),
        },
        v => Err(Error::structural_mismatch(format!(
            "src kind must be a record, {} given",
            v.kind()
        ))),
    }
}

/// Follows a destination pointer, allocating its target if needed.
fn deref(dst: &mut Value) -> &mut Value {
    match dst {
        Value::Pointer(p) => p.target_or_alloc(),
        d => d,
    }
}

fn mismatch(src: Kind, dst: Kind) -> Error {
    Error::structural_mismatch(format!("src kind {src} differs from dst kind {dst}"))
}

struct Copier<'a> {
    options: &'a CopyOptions,
}

impl Copier<'_> {
    fn copy(
        &self,
        filter: &FieldFilter,
        src: &Value,
        dst: &mut Value,
        depth: usize,
    ) -> Result<(), Error> {
        if depth > self.options.max_depth() {
            return Err(Error::depth_exceeded(self.options.max_depth()));
        }
        let (src_kind, dst_kind) = (src.pointee_kind(), dst.pointee_kind());
        if src_kind != dst_kind {
            return Err(mismatch(src_kind, dst_kind));
        }
        match src {
            Value::Record(s) => self.record(filter, s, dst, depth),
            Value::Pointer(s) => self.pointer(filter, s, dst, depth),
            Value::Any(s) => match deref(dst) {
                Value::Any(d) => self.any(filter, s, d, depth),
                d => Err(mismatch(Kind::Any, d.kind())),
            },
            Value::Interface(s) => self.interface(filter, s, dst, depth),
            Value::List(s) => self.list(filter, src, s, dst, depth),
            Value::Array(s) => self.array(filter, src, s, dst, depth),
            _ => assign(src, dst),
        }
    }

    fn record(
        &self,
        filter: &FieldFilter,
        src: &Record,
        dst: &mut Value,
        depth: usize,
    ) -> Result<(), Error> {
        if let Value::Record(d) = dst {
            if filter.is_empty() && Arc::ptr_eq(src.record_type(), d.record_type()) {
                tracing::trace!("copying the whole {} record", src.record_type().name());
                *d = src.clone();
                return Ok(());
            }
        }
        let dst = match deref(dst) {
            Value::Record(d) => d,
            d => return Err(mismatch(Kind::Record, d.kind())),
        };

        check_known_fields(filter, src, self.options)?;
        let dst_type = dst.record_type().clone();
        for (field, value) in src.fields() {
            let Some(sub) = filter.filter(field.name_for(self.options.source_tag())) else {
                continue;
            };
            if !field.exported() {
                continue;
            }
            let dst_name = field.name_for(self.options.destination_tag());
            let index = match dst_type.field(dst_name) {
                Some((i, f)) if f.exported() => i,
                Some(_) => {
                    return Err(Error::unwritable(format!(
                        "cannot set a value on the unexported destination field {dst_name}"
                    ))
                    .within(field.name()));
                }
                None => {
                    return Err(Error::unwritable(format!(
                        "cannot set a value on the destination field {dst_name}, missing from {}",
                        dst_type.name()
                    ))
                    .within(field.name()));
                }
            };
            self.copy(sub, value, dst.value_at_mut(index), depth + 1)
                .map_err(|e| e.within(field.name()))?;
        }
        Ok(())
    }

    fn pointer(
        &self,
        filter: &FieldFilter,
        src: &Pointer,
        dst: &mut Value,
        depth: usize,
    ) -> Result<(), Error> {
        let Some(target) = src.target() else {
            dst.clear();
            return Ok(());
        };
        if let Value::Any(s) = target {
            let Value::Pointer(d) = dst else {
                return Err(Error::structural_mismatch(format!(
                    "dst kind is {}, expected a pointer to an Any",
                    dst.kind()
                )));
            };
            return match d.target_or_alloc() {
                Value::Any(d) => self.any(filter, s, d, depth),
                d => Err(mismatch(Kind::Any, d.kind())),
            };
        }
        self.copy(filter, target, deref(dst), depth + 1)
    }

    fn any(
        &self,
        filter: &FieldFilter,
        src: &Any,
        dst: &mut Any,
        depth: usize,
    ) -> Result<(), Error> {
        let registry = self.options.registry();
        let src_record = src.to_record(registry).map_err(Error::codec)?;
        let type_url = dst
            .type_url()
            .or(src.type_url())
            .unwrap_or_default()
            .to_string();
        let dst_record = dst.to_record_as(&type_url, registry).map_err(Error::codec)?;
        tracing::debug!("decoded Any payloads, dst type URL {type_url}");

        let mut updated = Value::Record(dst_record);
        self.copy(filter, &Value::Record(src_record), &mut updated, depth + 1)?;
        if let Value::Record(r) = &updated {
            *dst = Any::from_record(r);
        }
        Ok(())
    }

    fn interface(
        &self,
        filter: &FieldFilter,
        src: &Interface,
        dst: &mut Value,
        depth: usize,
    ) -> Result<(), Error> {
        let dst = match deref(dst) {
            Value::Interface(d) => d,
            d => return Err(mismatch(Kind::Interface, d.kind())),
        };
        let Some(concrete) = src.target() else {
            dst.set_target(None);
            return Ok(());
        };
        if dst.is_null() {
            let Value::Pointer(p) = concrete else {
                return Err(Error::structural_mismatch(format!(
                    "expected a pointer for an interface value, got {} instead",
                    concrete.kind()
                )));
            };
            if let Shape::Record(ty) = p.pointee() {
                let ty = ty.get();
                if !ty.implements(dst.interface_type()) {
                    return Err(Error::capability_mismatch(format!(
                        "{} does not implement {}",
                        ty.name(),
                        dst.interface_type().name()
                    )));
                }
            }
            tracing::trace!(
                "allocating a new value for the {} interface",
                dst.interface_type().name()
            );
            let pointee = p.pointee().clone();
            let zero = pointee.zero();
            dst.set_target(Some(Value::Pointer(Pointer::new(pointee, Some(zero)))));
        }
        let interface = dst.interface_type().clone();
        match dst.target_mut() {
            Some(target) if matches!(target, Value::Pointer(_)) => {
                self.copy(filter, concrete, target, depth + 1)
            }
            // A value stored directly in an interface is not addressable.
            _ => Err(Error::unwritable(format!(
                "cannot set a value on the non-pointer value in the {} interface",
                interface.name()
            ))),
        }
    }

    fn list(
        &self,
        filter: &FieldFilter,
        src_value: &Value,
        src: &List,
        dst: &mut Value,
        depth: usize,
    ) -> Result<(), Error> {
        let dst = match deref(dst) {
            Value::List(d) => d,
            d => return Err(mismatch(Kind::List, d.kind())),
        };
        if src.is_null() {
            *dst.items_mut() = None;
            return Ok(());
        }
        let len = self.options.sequence_len(src_value, src.len());
        let element = dst.element().clone();
        let items = dst.items_mut().get_or_insert_with(Vec::new);
        for (i, item) in src.items()[..len].iter().enumerate() {
            if i < items.len() {
                self.copy(filter, item, &mut items[i], depth + 1)
                    .map_err(|e| e.within(i.to_string()))?;
            } else {
                let mut new_item = element.zero();
                self.copy(filter, item, &mut new_item, depth + 1)
                    .map_err(|e| e.within(i.to_string()))?;
                items.push(new_item);
            }
        }
        items.truncate(len);
        Ok(())
    }

    fn array(
        &self,
        filter: &FieldFilter,
        src_value: &Value,
        src: &Array,
        dst: &mut Value,
        depth: usize,
    ) -> Result<(), Error> {
        let dst = match deref(dst) {
            Value::Array(d) => d,
            d => return Err(mismatch(Kind::Array, d.kind())),
        };
        let len = self.options.sequence_len(src_value, src.len());
        if dst.len() < len {
            return Err(Error::array_capacity(dst.len(), len));
        }
        for (i, (item, slot)) in src.items()[..len]
            .iter()
            .zip(dst.items_mut().iter_mut())
            .enumerate()
        {
            self.copy(filter, item, slot, depth + 1)
                .map_err(|e| e.within(i.to_string()))?;
        }
        Ok(())
    }
}

/// Assigns a map or a scalar, following a destination pointer.
fn assign(src: &Value, dst: &mut Value) -> Result<(), Error> {
    let dst = deref(dst);
    let compatible = match (src, &*dst) {
        (Value::Map(s), Value::Map(d)) => s.value_shape() == d.value_shape(),
        (s, d) => s.kind() == d.kind(),
    };
    if !compatible {
        return Err(Error::structural_mismatch(format!(
            "cannot assign a {} value to a {} destination",
            src.kind(),
            dst.kind()
        )));
    }
    *dst = src.clone();
    Ok(())
}
