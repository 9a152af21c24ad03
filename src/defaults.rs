//! Fills declared defaults into a value graph.

use std::{
    error::Error,
    fmt::{self, Display},
};

use facet_core::{Facet, Field};
use facet_reflect::{Partial, Peek, ReflectError};

use crate::{
    attributes,
    descriptor::{DescriptorError, build_default},
    kind::Kind,
    rebuild::{FieldPolicy, Verbatim, rebuild},
};

/// A default that could not be applied, or a graph that could not be
/// rebuilt.
#[derive(Debug)]
pub struct DefaultError {
    field: Option<&'static str>,
    source: DescriptorError,
}

impl DefaultError {
    /// Name of the field whose default failed. `None` when the graph
    /// itself could not be rebuilt.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// The underlying descriptor error.
    pub fn descriptor_error(&self) -> &DescriptorError {
        &self.source
    }
}

impl Display for DefaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(
                f,
                "failed to parse default tag for field {field}: {}",
                self.source
            ),
            None => write!(f, "failed to rebuild value: {}", self.source),
        }
    }
}

impl Error for DefaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl From<ReflectError> for DefaultError {
    fn from(error: ReflectError) -> Self {
        DefaultError {
            field: None,
            source: DescriptorError::Reflect(error),
        }
    }
}

/// Writes the declared default of every field in `root`, recursing through
/// nested records, sequences, maps, smart pointers and set optional values.
///
/// Fields with a `#[facet(default_value = "...")]` are overwritten whatever
/// they hold; record-typed fields ignore theirs and are recursed into. The
/// walk stops at the first failing field: fields before it keep their new
/// values, the failing field and everything after it keep their old ones.
/// Roots that are not records, sequences or maps are left alone.
pub fn set_defaults<'facet, T: Facet<'facet>>(root: &mut T) -> Result<(), DefaultError> {
    log::trace!("Setting defaults on {}", T::SHAPE);

    if !Kind::leaf_of(T::SHAPE).is_composite() {
        return Ok(());
    }

    let mut walker = Walker::default();
    let mut partial = Partial::alloc::<T>()?;
    let rebuilt = rebuild(partial.inner_mut(), Peek::new(&*root), &mut walker);
    match (rebuilt, walker.failure) {
        (Ok(()), failure) => {
            *root = *partial.build()?;
            failure.map_or(Ok(()), Err)
        }
        (Err(_), Some(failure)) => Err(failure),
        (Err(error), None) => Err(error.into()),
    }
}

#[derive(Default)]
struct Walker {
    failure: Option<DefaultError>,
}

impl<'facet> FieldPolicy<'facet> for Walker {
    fn write_field(
        &mut self,
        partial: &mut Partial<'facet>,
        field: &Field,
        _source: Peek<'_, 'facet>,
    ) -> Result<bool, ReflectError> {
        if self.failure.is_some() {
            return Ok(false);
        }
        let Some(descriptor) = attributes::default_descriptor(field) else {
            return Ok(false);
        };
        if Kind::leaf_of(field.shape()) == Kind::Record {
            return Ok(false);
        }

        let layout = attributes::layout(field);
        match build_default(field.shape(), &descriptor, layout.as_deref()) {
            Ok(value) => {
                rebuild(partial, value.peek(), &mut Verbatim)?;
                log::trace!("Field {} defaulted from {descriptor:?}", field.name);
                Ok(true)
            }
            Err(source) => {
                log::debug!("Default of field {} failed: {source}", field.name);
                self.failure = Some(DefaultError {
                    field: Some(field.name),
                    source,
                });
                Ok(false)
            }
        }
    }
}
