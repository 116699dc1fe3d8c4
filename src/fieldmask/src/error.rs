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

//! Errors reported by this crate.

use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The error returned by [copy_into][crate::copy_into] and
/// [copy_into_mapping][crate::copy_into_mapping].
///
/// All these errors are the result of a precondition violation: the source and
/// destination do not have compatible shapes, the mask names fields that
/// cannot be written, or an [Any][crate::Any] payload cannot be decoded.
/// Retrying the same call will fail in the same way.
///
/// The type offers a series of predicates to determine the error kind, and
/// the [path][Error::path] of the field where the problem was detected.
///
/// # Example
/// ```
/// use google_cloud_fieldmask::Error;
/// match example_function() {
///     Err(e) if e.is_structural_mismatch() => {
///         println!("the source and destination disagree at {}", e.path());
///     }
///     Err(e) => println!("some other error {e}"),
///     Ok(_) => println!("success"),
/// }
///
/// fn example_function() -> Result<(), Error> {
///     // ... details omitted ...
///     # Err(Error::structural_mismatch("src kind i32 differs from dst kind string"))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    path: Vec<String>,
    source: Option<BoxError>,
}

impl Error {
    /// The source and destination values have incompatible kinds.
    ///
    /// For example, one is a record and the other a scalar, or both are scalars
    /// of different types.
    pub fn structural_mismatch<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::StructuralMismatch, message)
    }

    /// Returns true if the source and destination have incompatible kinds.
    pub fn is_structural_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::StructuralMismatch)
    }

    /// The destination field cannot receive a value.
    ///
    /// The field is missing from the destination record, or it is not
    /// exported.
    pub fn unwritable<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Unwritable, message)
    }

    /// Returns true if a destination field cannot receive a value.
    pub fn is_unwritable(&self) -> bool {
        matches!(self.kind, ErrorKind::Unwritable)
    }

    /// The filter names a field that does not exist in the source record.
    ///
    /// Only reported when [strict][crate::CopyOptions::set_strict] field
    /// resolution is enabled.
    pub fn unknown_field<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::UnknownField, message)
    }

    /// Returns true if the filter names a field missing from the source.
    pub fn is_unknown_field(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownField)
    }

    /// The concrete value in an interface does not implement the capabilities
    /// required by the destination interface.
    pub fn capability_mismatch<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::CapabilityMismatch, message)
    }

    /// Returns true if an interface capability check failed.
    pub fn is_capability_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::CapabilityMismatch)
    }

    /// A fixed-size destination array is shorter than the source.
    ///
    /// Arrays cannot grow, and the copy never truncates the source silently.
    pub fn array_capacity(dst_len: usize, src_len: usize) -> Self {
        Self::new(
            ErrorKind::ArrayCapacity,
            format!("dst array size {dst_len} is less than src size {src_len}"),
        )
    }

    /// Returns true if a destination array is too small.
    pub fn is_array_capacity(&self) -> bool {
        matches!(self.kind, ErrorKind::ArrayCapacity)
    }

    /// An [Any][crate::Any] payload could not be decoded or encoded.
    pub fn codec<T: Into<BoxError>>(source: T) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(ErrorKind::Codec, "")
        }
    }

    /// Returns true if an [Any][crate::Any] payload could not be processed.
    pub fn is_codec(&self) -> bool {
        matches!(self.kind, ErrorKind::Codec)
    }

    /// The values are nested deeper than [max_depth][crate::CopyOptions::set_max_depth].
    pub fn depth_exceeded(limit: usize) -> Self {
        Self::new(
            ErrorKind::DepthExceeded,
            format!("the values are nested deeper than the limit of {limit}"),
        )
    }

    /// Returns true if the copy exceeded the maximum recursion depth.
    pub fn is_depth_exceeded(&self) -> bool {
        matches!(self.kind, ErrorKind::DepthExceeded)
    }

    /// The dotted path of the field where the error was detected.
    ///
    /// The path is empty for errors detected at the top-level record.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Prefix the error path with the name of the enclosing field.
    pub(crate) fn within<T: Into<String>>(mut self, field: T) -> Self {
        self.path.insert(0, field.into());
        self
    }

    fn new<T: Into<String>>(kind: ErrorKind, message: T) -> Self {
        Self {
            kind,
            message: message.into(),
            path: Vec::new(),
            source: None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Codec, Some(e)) => write!(f, "cannot process the Any payload: {e}")?,
            _ => write!(f, "{}", self.message)?,
        }
        if !self.path.is_empty() {
            write!(f, " (at field {})", self.path())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ErrorKind {
    StructuralMismatch,
    Unwritable,
    UnknownField,
    CapabilityMismatch,
    ArrayCapacity,
    Codec,
    DepthExceeded,
}

/// Indicates a problem building a [Mask][crate::Mask] from text or paths.
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum MaskError {
    /// A path contains an empty segment, e.g. `a..b`, `.a` or `a.`.
    #[error("invalid field mask format: {0:?}")]
    InvalidPath(String),

    /// A `{` is not preceded by a field name.
    #[error("expected a field name before '{{' at offset {0}")]
    UnexpectedBrace(usize),

    /// The braces in the mask text are not balanced.
    #[error("unbalanced braces in field mask at offset {0}")]
    UnbalancedBraces(usize),
}
