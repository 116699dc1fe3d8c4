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

//! Field mask utilities for Google Cloud APIs.
//!
//! **WARNING:** this crate is under active development. We expect multiple
//! breaking changes in the upcoming releases. Testing is also incomplete, we do
//! **not** recommend that you use this crate in production. We welcome feedback
//! about the APIs, documentation, missing features, bugs, etc.
//!
//! Update operations in Google Cloud APIs receive a resource and a
//! [FieldMask]. Only the fields named in the mask are changed, all other
//! fields in the target resource are left untouched. This crate implements
//! those partial-update semantics without any per-field code:
//!
//! * A [Mask] is a tree of field names. It can be parsed from a compact text
//!   format (`a,b{c,d}`) or built from the dotted paths in a [FieldMask].
//! * A [FieldFilter] is the query interface used while copying. It is built
//!   from a [Mask] (copy only the named fields) or from an [InverseMask] (copy
//!   everything except the named fields).
//! * [copy_into] copies the selected fields of a record into another record,
//!   [copy_into_mapping] copies them into a JSON object.
//!
//! Records are dynamic [Value]s described by a [RecordType]. The source and
//! destination do not need to share a type, only a compatible shape.
//!
//! # Example
//! ```
//! # use google_cloud_fieldmask::*;
//! # use std::sync::Arc;
//! let image = Arc::new(
//!     RecordType::builder("Image")
//!         .field("OriginalUrl", Shape::String)
//!         .field("ResizedUrl", Shape::String)
//!         .build(),
//! );
//! let src = Record::new(image.clone())
//!     .set("OriginalUrl", "original.jpg")?
//!     .set("ResizedUrl", "resized.jpg")?;
//! let mut dst = Value::from(Record::new(image.clone()));
//!
//! let filter = FieldFilter::from(Mask::parse("ResizedUrl")?);
//! copy_into(&filter, &Value::from(src), &mut dst, &CopyOptions::new())?;
//!
//! let dst = dst.as_record().unwrap();
//! assert_eq!(dst.get("ResizedUrl"), Some(&Value::from("resized.jpg")));
//! assert_eq!(dst.get("OriginalUrl"), Some(&Value::from("")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod any;
pub use crate::any::*;
mod codec;
pub use crate::codec::{from_json, to_json};
mod copy;
pub use crate::copy::copy_into;
pub mod error;
pub use crate::error::{Error, MaskError};
mod field_mask;
pub use crate::field_mask::*;
mod filter;
pub use crate::filter::*;
mod mapping;
pub use crate::mapping::copy_into_mapping;
mod mask;
pub use crate::mask::*;
pub mod options;
pub use crate::options::CopyOptions;
mod schema;
pub use crate::schema::*;
mod value;
pub use crate::value::*;

/// The generic string-keyed mapping produced by [copy_into_mapping].
///
/// Protobuf (and consequently the Google Cloud APIs) use `Struct` to represent
/// JSON objects.
pub type Struct = serde_json::Map<String, serde_json::Value>;
