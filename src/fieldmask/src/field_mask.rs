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

/// A list of dotted field paths, as found in update requests.
///
/// Each path names a field, and sub-fields are separated by `.`. For example,
/// `["id", "avatar.original_url"]` selects the `id` field and the
/// `original_url` field of the record in `avatar`. Fields not named by any
/// path are left untouched by an update.
///
/// Use [Mask::from_field_mask][crate::Mask::from_field_mask] to convert the
/// paths into a tree, and then [copy_into][crate::copy_into] to apply the
/// update.
///
/// In JSON the paths are joined into a single comma-separated string:
///
/// ```
/// # use google_cloud_fieldmask::FieldMask;
/// let mask = FieldMask::default().set_paths(["id", "avatar.original_url"]);
/// let json = serde_json::to_value(&mask)?;
/// assert_eq!(json, serde_json::json!({"paths": "id,avatar.original_url"}));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Encoded", into = "Encoded")]
#[non_exhaustive]
pub struct FieldMask {
    /// The set of field mask paths.
    pub paths: Vec<String>,
}

impl FieldMask {
    /// Set the paths.
    pub fn set_paths<T, V>(mut self, paths: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.paths = paths.into_iter().map(|v| v.into()).collect();
        self
    }
}

/// The JSON form of a [FieldMask].
#[derive(serde::Serialize, serde::Deserialize)]
struct Encoded {
    #[serde(default)]
    paths: String,
}

impl From<Encoded> for FieldMask {
    fn from(value: Encoded) -> Self {
        let paths = value
            .paths
            .split(',')
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        FieldMask::default().set_paths(paths)
    }
}

impl From<FieldMask> for Encoded {
    fn from(value: FieldMask) -> Self {
        Self {
            paths: value.paths.join(","),
        }
    }
}
