#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

use std::{
    error::Error,
    fmt::{self, Display},
};

use facet_core::Facet;
use facet_reflect::Peek;

pub mod attributes;
pub mod codec;
pub mod descriptor;
pub mod kind;
pub mod path;
pub mod rebuild;
pub mod value;

mod defaults;
mod resolve;
mod scalar;

pub use defaults::{DefaultError, set_defaults};
pub use descriptor::{DescriptorError, apply_descriptor, parse_descriptor};
pub use kind::{Kind, ScalarType};
pub use path::{Path, PathError, PathErrorKind};
pub use resolve::resolve;
pub use scalar::{Complex, Duration};
pub use value::{FromValue, Resolved, Value};

/// Resolves `path` against `root` and returns a copy of what it addresses.
///
/// `Ok(None)` means the path ends at an unset optional value.
pub fn get<'facet>(
    root: &impl Facet<'facet>,
    path: &str,
) -> Result<Option<Resolved<'facet>>, PathError> {
    let path = Path::parse(path)?;
    resolve(Peek::new(root), &path)
}

/// Resolves `path` against `root` and extracts a value of type `V`.
pub fn get_as<'facet, V: FromValue>(
    root: &impl Facet<'facet>,
    path: &str,
) -> Result<V, AccessError> {
    let resolved = get(root, path)?.ok_or(AccessError::NotFound)?;
    let found = resolved.type_name();
    let Some(value) = resolved.into_value() else {
        return Err(AccessError::TypeMismatch {
            expected: V::TYPE_NAME,
            found,
        });
    };
    V::from_value(value).map_err(|value| AccessError::TypeMismatch {
        expected: V::TYPE_NAME,
        found: value.type_name(),
    })
}

/// Error from [`get_as`].
#[derive(Debug)]
#[non_exhaustive]
pub enum AccessError {
    /// The path could not be parsed or resolved.
    Path(PathError),
    /// The path ends at an unset optional value.
    NotFound,
    /// The value has another type than the one asked for.
    TypeMismatch {
        /// The type asked for.
        expected: &'static str,
        /// The type found.
        found: &'static str,
    },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Path(error) => write!(f, "{error}"),
            AccessError::NotFound => {
                write!(f, "object belonging to the path could not be retrieved")
            }
            AccessError::TypeMismatch { expected, found } => {
                write!(f, "object is not a {expected} but a {found}")
            }
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AccessError::Path(error) => Some(error),
            _ => None,
        }
    }
}

impl From<PathError> for AccessError {
    fn from(error: PathError) -> Self {
        AccessError::Path(error)
    }
}
