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

use crate::FieldMask;
use crate::error::MaskError;
use std::collections::BTreeMap;

/// A tree-based representation of a field mask.
///
/// Each entry maps a field name to the mask for its sub-fields. A `Mask` with
/// no entries is a *leaf*: it selects the field and everything beneath it.
/// This also holds at the root, an empty mask selects the whole record.
///
/// # Text format
///
/// Masks have a compact text representation, a comma-separated list of field
/// names, each optionally followed by the mask for its sub-fields in braces:
///
/// ```
/// # use google_cloud_fieldmask::{Mask, MaskError};
/// let mask = Mask::parse("id, avatar{original_url}, friends{images{resized_url}}")?;
/// assert_eq!(mask.to_string(), "avatar{original_url},friends{images{resized_url}},id");
/// # Ok::<(), MaskError>(())
/// ```
///
/// Whitespace is not significant. Fields are printed in lexicographic order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mask {
    fields: BTreeMap<String, Mask>,
}

impl Mask {
    /// Creates an empty, and therefore universal, mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the sub-mask for `name`.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_fieldmask::Mask;
    /// let mask = Mask::new()
    ///     .set("id", Mask::new())
    ///     .set("avatar", Mask::new().set("original_url", Mask::new()));
    /// assert_eq!(mask.to_string(), "avatar{original_url},id");
    /// ```
    pub fn set<T: Into<String>>(mut self, name: T, mask: Mask) -> Self {
        self.fields.insert(name.into(), mask);
        self
    }

    /// Returns true if the mask selects everything under its position.
    pub fn is_leaf(&self) -> bool {
        self.fields.is_empty()
    }

    /// The number of fields named at this level.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are named at this level.
    ///
    /// Equivalent to [is_leaf][Mask::is_leaf].
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The sub-mask for `name`, if the field is named at this level.
    pub fn get(&self, name: &str) -> Option<&Mask> {
        self.fields.get(name)
    }

    /// Iterates over the fields named at this level, in lexicographic order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Mask)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn into_fields(self) -> BTreeMap<String, Mask> {
        self.fields
    }

    /// Parses a mask from its text representation.
    ///
    /// Empty field names between commas are ignored. If a field appears more
    /// than once at the same level the last occurrence wins.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_fieldmask::{Mask, MaskError};
    /// let mask = Mask::parse("a,b{c,d{e}}")?;
    /// assert!(mask.get("a").is_some_and(Mask::is_leaf));
    /// assert_eq!(mask.get("b").map(Mask::len), Some(2));
    ///
    /// let err = Mask::parse("a{b");
    /// assert!(matches!(err, Err(MaskError::UnbalancedBraces(_))));
    /// # Ok::<(), MaskError>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self, MaskError> {
        let chars = text.chars().collect::<Vec<_>>();
        let mut pos = 0;
        parse_level(&chars, &mut pos, 0)
    }

    /// Creates a mask from a list of dotted paths.
    ///
    /// Each path is split on `.`, and each segment is converted to a field
    /// name using `mapper`. All the paths are merged into a single tree. Once
    /// a field has sub-fields it is no longer a leaf, so `["a", "a.b"]`
    /// selects only `a.b`, regardless of the order of the paths.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_fieldmask::{Mask, MaskError, camel_case};
    /// let mask = Mask::from_paths(["user.display_name", "photo"], camel_case)?;
    /// assert_eq!(mask.to_string(), "Photo,User{DisplayName}");
    ///
    /// let err = Mask::from_paths(["a..b"], camel_case);
    /// assert!(matches!(err, Err(MaskError::InvalidPath(_))));
    /// # Ok::<(), MaskError>(())
    /// ```
    pub fn from_paths<I, S, F>(paths: I, mapper: F) -> Result<Self, MaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> String,
    {
        let mut root = Mask::new();
        for path in paths {
            let path = path.as_ref();
            let mut node = &mut root;
            for segment in path.split('.') {
                if segment.is_empty() {
                    return Err(MaskError::InvalidPath(path.to_string()));
                }
                node = node.fields.entry(mapper(segment)).or_default();
            }
        }
        tracing::debug!("created mask {root} from paths");
        Ok(root)
    }

    /// Creates a mask from the paths in a [FieldMask].
    ///
    /// The paths in a [FieldMask] use the field names from the service
    /// definition. Use `mapper` to convert them to the field names in your
    /// records, for example with [camel_case] or [identity].
    pub fn from_field_mask<F>(field_mask: &FieldMask, mapper: F) -> Result<Self, MaskError>
    where
        F: Fn(&str) -> String,
    {
        Self::from_paths(&field_mask.paths, mapper)
    }
}

impl std::fmt::Display for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, sub)) in self.fields.iter().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
            if !sub.is_leaf() {
                write!(f, "{{{sub}}}")?;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Mask {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K> FromIterator<(K, Mask)> for Mask
where
    K: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Mask)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

fn parse_level(chars: &[char], pos: &mut usize, depth: usize) -> Result<Mask, MaskError> {
    let mut mask = Mask::new();
    let mut name = String::new();
    while let Some(c) = chars.get(*pos) {
        match c {
            ' ' | '\t' | '\n' | '\r' => {}
            ',' => {
                if !name.is_empty() {
                    mask.fields.insert(std::mem::take(&mut name), Mask::new());
                }
            }
            '{' => {
                if name.is_empty() {
                    return Err(MaskError::UnexpectedBrace(*pos));
                }
                *pos += 1;
                let sub = parse_level(chars, pos, depth + 1)?;
                mask.fields.insert(std::mem::take(&mut name), sub);
                // The nested call consumed the closing brace.
                continue;
            }
            '}' => {
                if depth == 0 {
                    return Err(MaskError::UnbalancedBraces(*pos));
                }
                if !name.is_empty() {
                    mask.fields.insert(std::mem::take(&mut name), Mask::new());
                }
                *pos += 1;
                return Ok(mask);
            }
            c => name.push(*c),
        }
        *pos += 1;
    }
    if depth != 0 {
        return Err(MaskError::UnbalancedBraces(*pos));
    }
    if !name.is_empty() {
        mask.fields.insert(name, Mask::new());
    }
    Ok(mask)
}

/// A field mask with inverted semantics.
///
/// The fields named in an `InverseMask` are *not* copied, all other fields
/// are. A named field with sub-fields is copied, except for the named
/// sub-fields.
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::{FieldFilter, InverseMask, MaskError};
/// let mask = InverseMask::parse("id,friends{username}")?;
/// let filter = FieldFilter::from(mask);
/// assert!(filter.filter("id").is_none());
/// assert!(filter.filter("username").is_some());
/// let friends = filter.filter("friends").unwrap();
/// assert!(friends.filter("username").is_none());
/// assert!(friends.filter("id").is_some());
/// # Ok::<(), MaskError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InverseMask(Mask);

impl InverseMask {
    /// Creates an inverse mask from the fields in `mask`.
    pub fn new(mask: Mask) -> Self {
        Self(mask)
    }

    /// Parses an inverse mask, using the same text format as [Mask::parse].
    pub fn parse(text: &str) -> Result<Self, MaskError> {
        Mask::parse(text).map(Self)
    }

    /// Creates an inverse mask from a list of dotted paths.
    ///
    /// See [Mask::from_paths] for details.
    pub fn from_paths<I, S, F>(paths: I, mapper: F) -> Result<Self, MaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> String,
    {
        Mask::from_paths(paths, mapper).map(Self)
    }

    /// Creates an inverse mask from the paths in a [FieldMask].
    pub fn from_field_mask<F>(field_mask: &FieldMask, mapper: F) -> Result<Self, MaskError>
    where
        F: Fn(&str) -> String,
    {
        Mask::from_field_mask(field_mask, mapper).map(Self)
    }

    /// The tree of excluded fields.
    pub fn mask(&self) -> &Mask {
        &self.0
    }

    pub(crate) fn into_mask(self) -> Mask {
        self.0
    }
}

impl From<Mask> for InverseMask {
    fn from(value: Mask) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for InverseMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A name mapper that returns the field name unchanged.
pub fn identity(name: &str) -> String {
    name.to_string()
}

/// A name mapper that converts `snake_case` names to `CamelCase`.
///
/// This follows the conventions used by protobuf code generators: an
/// underscore followed by a lowercase letter is removed and the letter is
/// capitalized, a leading underscore becomes `X`.
///
/// # Example
/// ```
/// # use google_cloud_fieldmask::camel_case;
/// assert_eq!(camel_case("display_name"), "DisplayName");
/// assert_eq!(camel_case("_private"), "XPrivate");
/// ```
pub fn camel_case(name: &str) -> String {
    let chars = name.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(name.len() + 1);
    let mut i = 0;
    if chars.first() == Some(&'_') {
        out.push('X');
        i = 1;
    }
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c == '_' && chars.get(i).is_some_and(char::is_ascii_lowercase) {
            continue;
        }
        if c.is_ascii_digit() {
            out.push(c);
            continue;
        }
        out.push(c.to_ascii_uppercase());
        while let Some(next) = chars.get(i).filter(|c| c.is_ascii_lowercase()) {
            out.push(*next);
            i += 1;
        }
    }
    out
}
