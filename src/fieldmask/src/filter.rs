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

use crate::{InverseMask, Mask};
use std::collections::BTreeMap;

/// Selects the fields copied by [copy_into][crate::copy_into] and
/// [copy_into_mapping][crate::copy_into_mapping].
///
/// At each level of a record the copy engine asks the filter whether a field
/// is included, and what filter applies to the field's own sub-fields.
///
/// A filter is one of:
/// * [All][FieldFilter::All]: every field is included, recursively.
/// * [Only][FieldFilter::Only]: only the named fields are included.
/// * [Except][FieldFilter::Except]: all fields except the named ones are
///   included. A named field with a non-leaf filter is included, but its
///   sub-fields are filtered.
///
/// The sub-filters may have a different polarity than their parent. For
/// example, an `Only` filter can select a field and exclude some of its
/// sub-fields.
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::{FieldFilter, Mask, MaskError};
/// let filter = FieldFilter::only([
///     ("id", FieldFilter::All),
///     ("avatar", FieldFilter::except([("resized_url", FieldFilter::All)])),
/// ]);
/// assert!(filter.filter("username").is_none());
/// let avatar = filter.filter("avatar").unwrap();
/// assert!(avatar.filter("resized_url").is_none());
/// assert!(avatar.filter("original_url").is_some_and(FieldFilter::is_empty));
///
/// assert_eq!(FieldFilter::from(Mask::parse("")?), FieldFilter::All);
/// # Ok::<(), MaskError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldFilter {
    /// Include every field, recursively.
    #[default]
    All,
    /// Include only the named fields, filtering their sub-fields with the
    /// corresponding filter.
    Only(BTreeMap<String, FieldFilter>),
    /// Include every field except the named fields with an
    /// [All][FieldFilter::All] filter. Other named fields are included, and
    /// their sub-fields filtered.
    Except(BTreeMap<String, FieldFilter>),
}

static ALL: FieldFilter = FieldFilter::All;

impl FieldFilter {
    /// Creates an inclusion filter.
    ///
    /// An empty list of fields creates an [All][FieldFilter::All] filter.
    pub fn only<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldFilter)>,
        K: Into<String>,
    {
        let fields = collect(fields);
        if fields.is_empty() {
            return Self::All;
        }
        Self::Only(fields)
    }

    /// Creates an exclusion filter.
    ///
    /// An empty list of fields creates an [All][FieldFilter::All] filter.
    pub fn except<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldFilter)>,
        K: Into<String>,
    {
        let fields = collect(fields);
        if fields.is_empty() {
            return Self::All;
        }
        Self::Except(fields)
    }

    /// Returns the filter for the sub-fields of `name`, or `None` if the field
    /// is not included.
    pub fn filter(&self, name: &str) -> Option<&FieldFilter> {
        match self {
            Self::All => Some(&ALL),
            Self::Only(fields) if fields.is_empty() => Some(&ALL),
            Self::Only(fields) => fields.get(name),
            Self::Except(fields) => match fields.get(name) {
                None => Some(&ALL),
                Some(sub) if sub.is_empty() => None,
                Some(sub) => Some(sub),
            },
        }
    }

    /// Returns true if the filter includes every field, recursively.
    ///
    /// The copy engine uses this to replace a field-by-field copy with a single
    /// assignment when the source and destination types match.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => true,
            Self::Only(fields) | Self::Except(fields) => fields.is_empty(),
        }
    }

    /// The names listed by an [Only][FieldFilter::Only] filter.
    pub(crate) fn included_names(&self) -> impl Iterator<Item = &str> {
        let fields = match self {
            Self::Only(fields) => Some(fields),
            _ => None,
        };
        fields.into_iter().flat_map(|f| f.keys().map(String::as_str))
    }
}

fn collect<I, K>(fields: I) -> BTreeMap<String, FieldFilter>
where
    I: IntoIterator<Item = (K, FieldFilter)>,
    K: Into<String>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

impl From<Mask> for FieldFilter {
    fn from(value: Mask) -> Self {
        Self::only(
            value
                .into_fields()
                .into_iter()
                .map(|(k, v)| (k, FieldFilter::from(v))),
        )
    }
}

impl From<InverseMask> for FieldFilter {
    fn from(value: InverseMask) -> Self {
        fn inverse(mask: Mask) -> FieldFilter {
            FieldFilter::except(
                mask.into_fields()
                    .into_iter()
                    .map(|(k, v)| (k, inverse(v))),
            )
        }
        inverse(value.into_mask())
    }
}
