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

//! Options for [copy_into][crate::copy_into] and
//! [copy_into_mapping][crate::copy_into_mapping].
//!
//! The defaults work for records that share field names. Applications change
//! them to rename fields through tags, limit how many elements of a list are
//! copied, customize the mapping output, or decode [Any][crate::Any] payloads.

use crate::{FieldFilter, TypeRegistry, Value};
use std::sync::Arc;

/// The default value for [CopyOptions::max_depth].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Computes how many elements of a list or array are copied.
///
/// The result is clamped to the length of the source sequence.
pub trait SequenceLimit: Send + Sync {
    fn limit(&self, src: &Value) -> usize;
}

impl<F> SequenceLimit for F
where
    F: Fn(&Value) -> usize + Send + Sync,
{
    fn limit(&self, src: &Value) -> usize {
        self(src)
    }
}

/// Customizes how [copy_into_mapping][crate::copy_into_mapping] writes each
/// field.
///
/// The visitor is called once for every field included by the filter, before
/// the default handling.
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::*;
/// # use google_cloud_fieldmask::options::VisitResult;
/// let options = CopyOptions::new().set_field_visitor(
///     |_: &FieldFilter, _src: &str, dst: &str, value: &Value| match (dst, value) {
///         ("Password", _) => VisitResult::new().set_skip_default(true),
///         (_, Value::I64(v)) => VisitResult::new()
///             .set_skip_default(true)
///             .set_replacement(v.to_string()),
///         _ => VisitResult::new(),
///     },
/// );
/// ```
pub trait FieldVisitor: Send + Sync {
    /// Called with the sub-filter for the field, the name of the field in the
    /// source, its key in the destination, and the source value.
    fn visit(&self, filter: &FieldFilter, src_name: &str, dst_name: &str, value: &Value)
    -> VisitResult;
}

impl<F> FieldVisitor for F
where
    F: Fn(&FieldFilter, &str, &str, &Value) -> VisitResult + Send + Sync,
{
    fn visit(
        &self,
        filter: &FieldFilter,
        src_name: &str,
        dst_name: &str,
        value: &Value,
    ) -> VisitResult {
        self(filter, src_name, dst_name, value)
    }
}

/// The result of a [FieldVisitor] call.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct VisitResult {
    /// Skip the default handling for this field.
    pub skip_default: bool,
    /// If set, this value is written to the destination key.
    pub replacement: Option<serde_json::Value>,
}

impl VisitResult {
    /// A result that keeps the default handling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the [skip_default][VisitResult::skip_default] field.
    pub fn set_skip_default(mut self, v: bool) -> Self {
        self.skip_default = v;
        self
    }

    /// Sets the [replacement][VisitResult::replacement] field.
    pub fn set_replacement<T: Into<serde_json::Value>>(mut self, v: T) -> Self {
        self.replacement = Some(v.into());
        self
    }
}

/// Configures a copy.
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::*;
/// # use google_cloud_fieldmask::options::DEFAULT_MAX_DEPTH;
/// let options = CopyOptions::new()
///     .set_destination_tag("json")
///     .set_sequence_limit(|_: &Value| 10);
/// assert_eq!(options.destination_tag(), Some("json"));
/// assert_eq!(options.source_tag(), None);
/// assert_eq!(options.max_depth(), DEFAULT_MAX_DEPTH);
/// ```
#[derive(Clone)]
pub struct CopyOptions {
    destination_tag: Option<String>,
    source_tag: Option<String>,
    sequence_limit: Option<Arc<dyn SequenceLimit>>,
    field_visitor: Option<Arc<dyn FieldVisitor>>,
    registry: Arc<TypeRegistry>,
    strict: bool,
    max_depth: usize,
}

impl CopyOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names destination fields using this tag of the source fields.
    ///
    /// Source fields without the tag are written to the destination field
    /// with the same name. For example, with `json` as the destination tag, a
    /// source field tagged `json:"user_name"` is copied into the destination
    /// field `user_name`, and [copy_into_mapping][crate::copy_into_mapping]
    /// writes it under the `user_name` key.
    pub fn set_destination_tag<T: Into<String>>(mut self, v: T) -> Self {
        self.destination_tag = Some(v.into());
        self
    }

    /// Gets the destination tag, if any.
    pub fn destination_tag(&self) -> Option<&str> {
        self.destination_tag.as_deref()
    }

    /// Matches the filter against source fields using this tag.
    ///
    /// Source fields without the tag are matched by their field name. For
    /// example, with `db` as the source tag, the path `user_name` selects a
    /// source field tagged `db:"user_name,omitempty"`.
    pub fn set_source_tag<T: Into<String>>(mut self, v: T) -> Self {
        self.source_tag = Some(v.into());
        self
    }

    /// Gets the source tag, if any.
    pub fn source_tag(&self) -> Option<&str> {
        self.source_tag.as_deref()
    }

    /// Limits how many elements of each source list or array are copied.
    ///
    /// The function receives the source sequence. Values larger than the
    /// sequence length are ignored.
    pub fn set_sequence_limit<V: SequenceLimit + 'static>(mut self, v: V) -> Self {
        self.sequence_limit = Some(Arc::new(v));
        self
    }

    /// The number of elements to copy from `src`, a list or an array.
    pub(crate) fn sequence_len(&self, src: &Value, len: usize) -> usize {
        self.sequence_limit
            .as_ref()
            .map_or(len, |f| f.limit(src).min(len))
    }

    /// Customizes the output of [copy_into_mapping][crate::copy_into_mapping].
    pub fn set_field_visitor<V: FieldVisitor + 'static>(mut self, v: V) -> Self {
        self.field_visitor = Some(Arc::new(v));
        self
    }

    /// Gets the field visitor, if any.
    pub fn field_visitor(&self) -> Option<&Arc<dyn FieldVisitor>> {
        self.field_visitor.as_ref()
    }

    /// Sets the registry used to decode [Any][crate::Any] payloads.
    pub fn set_registry<V: Into<Arc<TypeRegistry>>>(mut self, v: V) -> Self {
        self.registry = v.into();
        self
    }

    /// Gets the registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Rejects filters naming fields missing from the source record.
    ///
    /// By default such names are ignored.
    pub fn set_strict(mut self, v: bool) -> Self {
        self.strict = v;
        self
    }

    /// Returns true if strict field resolution is enabled.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Limits how deep the copy recurses into nested values.
    pub fn set_max_depth(mut self, v: usize) -> Self {
        self.max_depth = v;
        self
    }

    /// Gets the maximum recursion depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            destination_tag: None,
            source_tag: None,
            sequence_limit: None,
            field_visitor: None,
            registry: Arc::new(TypeRegistry::default()),
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl std::fmt::Debug for CopyOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyOptions")
            .field("destination_tag", &self.destination_tag)
            .field("source_tag", &self.source_tag)
            .field("sequence_limit", &self.sequence_limit.is_some())
            .field("field_visitor", &self.field_visitor.is_some())
            .field("registry", &self.registry)
            .field("strict", &self.strict)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
