//! Parses default descriptors against a target shape and writes the result.

use std::{
    collections::BTreeSet,
    error::Error,
    fmt::{self, Display},
};

use facet_core::{Def, Facet, Field, Shape, Type, UserType};
use facet_reflect::{HeapValue, Partial, ReflectError};
use serde_json::{Map, Value as Json};

use crate::{
    attributes, codec,
    kind::{Kind, ScalarType, is_opaque_wrapper, pointee},
    scalar::Complex,
    value::Value,
};

/// Error from parsing or applying a default descriptor.
#[derive(Debug)]
#[non_exhaustive]
pub enum DescriptorError {
    /// The descriptor is not a literal of the target type.
    InvalidSyntax {
        /// The offending descriptor.
        descriptor: String,
        /// Name of the type it was parsed against.
        target: &'static str,
    },
    /// The target type takes no descriptors.
    UnsupportedFieldType {
        /// Name of the target type.
        type_name: &'static str,
    },
    /// A container literal is not valid JSON.
    Literal(serde_json::Error),
    /// A container literal has the wrong shape for its target.
    LiteralMismatch {
        /// The JSON type the target needs.
        expected: &'static str,
    },
    /// A record literal names a field the record does not have.
    UnknownField {
        /// The name in the literal.
        name: String,
    },
    /// The parsed value could not be written into its target.
    Reflect(ReflectError),
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::InvalidSyntax { .. } => write!(f, "invalid syntax"),
            DescriptorError::UnsupportedFieldType { type_name } => {
                write!(f, "unsupported field type: {type_name}")
            }
            DescriptorError::Literal(error) => write!(f, "{error}"),
            DescriptorError::LiteralMismatch { expected } => {
                write!(f, "literal mismatch: expected a JSON {expected}")
            }
            DescriptorError::UnknownField { name } => write!(f, "no field named '{name}'"),
            DescriptorError::Reflect(error) => write!(f, "{error}"),
        }
    }
}

impl Error for DescriptorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DescriptorError::Literal(error) => Some(error),
            DescriptorError::Reflect(error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DescriptorError {
    fn from(error: serde_json::Error) -> Self {
        DescriptorError::Literal(error)
    }
}

impl From<ReflectError> for DescriptorError {
    fn from(error: ReflectError) -> Self {
        DescriptorError::Reflect(error)
    }
}

/// Parses `descriptor` as a literal of `target`. `layout` only affects
/// timestamps.
pub fn parse_descriptor(
    descriptor: &str,
    layout: Option<&str>,
    target: ScalarType,
) -> Result<Value, DescriptorError> {
    let value = match target {
        ScalarType::String => Some(Value::String(descriptor.to_owned())),
        ScalarType::Char => {
            let mut chars = descriptor.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        ScalarType::Bool => codec::parse_bool(descriptor).map(Value::Bool),
        ScalarType::I8 => descriptor.parse().ok().map(Value::I8),
        ScalarType::I16 => descriptor.parse().ok().map(Value::I16),
        ScalarType::I32 => descriptor.parse().ok().map(Value::I32),
        ScalarType::I64 => descriptor.parse().ok().map(Value::I64),
        ScalarType::I128 => descriptor.parse().ok().map(Value::I128),
        ScalarType::ISize => descriptor.parse().ok().map(Value::ISize),
        ScalarType::U8 => descriptor.parse().ok().map(Value::U8),
        ScalarType::U16 => descriptor.parse().ok().map(Value::U16),
        ScalarType::U32 => descriptor.parse().ok().map(Value::U32),
        ScalarType::U64 => descriptor.parse().ok().map(Value::U64),
        ScalarType::U128 => descriptor.parse().ok().map(Value::U128),
        ScalarType::USize => descriptor.parse().ok().map(Value::USize),
        ScalarType::F32 => codec::parse_f32(descriptor).map(Value::F32),
        ScalarType::F64 => codec::parse_f64(descriptor).map(Value::F64),
        ScalarType::Complex32 => codec::parse_complex(descriptor)
            .map(|c| Value::Complex32(Complex::new(c.re as f32, c.im as f32))),
        ScalarType::Complex64 => codec::parse_complex(descriptor).map(Value::Complex64),
        ScalarType::Timestamp => codec::parse_timestamp(descriptor, layout).map(Value::Timestamp),
        ScalarType::Duration => codec::parse_duration(descriptor).map(Value::Duration),
    };

    value.ok_or_else(|| DescriptorError::InvalidSyntax {
        descriptor: descriptor.to_owned(),
        target: target.name(),
    })
}

/// Parses `descriptor` against the type of `slot` and overwrites it.
///
/// Optional slots receive the parsed value wrapped. Sequence and map slots
/// take a JSON literal that replaces their contents. Opaque types are
/// parsed through their `FromStr`. On error the slot is left unmodified.
pub fn apply_descriptor<'facet, T: Facet<'facet>>(
    slot: &mut T,
    descriptor: &str,
    layout: Option<&str>,
) -> Result<(), DescriptorError> {
    log::debug!("Applying default {descriptor:?} to {}", T::SHAPE);

    let mut partial = Partial::alloc::<T>()?;
    write_descriptor(partial.inner_mut(), descriptor, layout)?;
    *slot = *partial.build()?;
    Ok(())
}

/// Builds a fresh value of `shape` from `descriptor`.
pub(crate) fn build_default<'facet>(
    shape: &'static Shape,
    descriptor: &str,
    layout: Option<&str>,
) -> Result<HeapValue<'facet>, DescriptorError> {
    let mut partial = Partial::alloc_shape(shape)?;
    write_descriptor(&mut partial, descriptor, layout)?;
    Ok(partial.build()?)
}

/// Writes `descriptor` into the current, uninitialized frame of `partial`.
pub(crate) fn write_descriptor(
    partial: &mut Partial<'_>,
    descriptor: &str,
    layout: Option<&str>,
) -> Result<(), DescriptorError> {
    let shape = partial.shape();
    log::trace!("Writing descriptor {descriptor:?} at {}", partial.path());

    match Kind::leaf_of(shape) {
        Kind::Sequence | Kind::Map => {
            let literal: Json = serde_json::from_str(descriptor)?;
            return write_literal(partial, &literal, layout);
        }
        Kind::Record => return Err(unsupported(shape)),
        _ => {}
    }

    if let Some(scalar_type) = ScalarType::of(shape) {
        parse_descriptor(descriptor, layout, scalar_type)?.write(partial)?;
        return Ok(());
    }

    match shape.def {
        Def::Option(_) => {
            partial.begin_some()?;
            write_descriptor(partial, descriptor, layout)?;
            partial.end()?;
            Ok(())
        }
        Def::Pointer(_) if pointee(shape).is_some() => {
            partial.begin_smart_ptr()?;
            write_descriptor(partial, descriptor, layout)?;
            partial.end()?;
            Ok(())
        }
        _ if !is_opaque_wrapper(shape) && shape.vtable.has_parse() => {
            partial
                .parse_from_str(descriptor)
                .map_err(|_| DescriptorError::InvalidSyntax {
                    descriptor: descriptor.to_owned(),
                    target: shape.type_identifier,
                })?;
            Ok(())
        }
        _ => Err(unsupported(shape)),
    }
}

fn write_literal(
    partial: &mut Partial<'_>,
    literal: &Json,
    layout: Option<&str>,
) -> Result<(), DescriptorError> {
    let shape = partial.shape();

    if let Some(scalar_type) = ScalarType::of(shape) {
        let text = match literal {
            Json::String(text) => text.clone(),
            Json::Number(number) => number.to_string(),
            Json::Bool(flag) => flag.to_string(),
            Json::Null | Json::Array(_) | Json::Object(_) => {
                return Err(DescriptorError::LiteralMismatch { expected: "scalar" });
            }
        };
        parse_descriptor(&text, layout, scalar_type)?.write(partial)?;
        return Ok(());
    }

    match shape.def {
        Def::Option(_) => {
            if literal.is_null() {
                partial.set_default()?;
                return Ok(());
            }
            partial.begin_some()?;
            write_literal(partial, literal, layout)?;
            partial.end()?;
            Ok(())
        }
        Def::Pointer(_) if pointee(shape).is_some() => {
            partial.begin_smart_ptr()?;
            write_literal(partial, literal, layout)?;
            partial.end()?;
            Ok(())
        }
        Def::List(_) => {
            let Json::Array(items) = literal else {
                return Err(DescriptorError::LiteralMismatch { expected: "array" });
            };
            partial.begin_list()?;
            for item in items {
                partial.begin_list_item()?;
                write_literal(partial, item, layout)?;
                partial.end()?;
            }
            Ok(())
        }
        Def::Array(def) => {
            let Json::Array(items) = literal else {
                return Err(DescriptorError::LiteralMismatch { expected: "array" });
            };
            if items.len() != def.n {
                return Err(DescriptorError::LiteralMismatch {
                    expected: "array of matching length",
                });
            }
            for (index, item) in items.iter().enumerate() {
                partial.begin_nth_element(index)?;
                write_literal(partial, item, layout)?;
                partial.end()?;
            }
            Ok(())
        }
        Def::Map(def) => {
            let Json::Object(entries) = literal else {
                return Err(DescriptorError::LiteralMismatch { expected: "object" });
            };
            let Some(key_type) = ScalarType::of(def.k()) else {
                return Err(unsupported(shape));
            };
            partial.begin_map()?;
            for (key, item) in entries {
                let key = parse_descriptor(key, None, key_type)?;
                partial.begin_key()?;
                key.write(partial)?;
                partial.end()?;
                partial.begin_value()?;
                write_literal(partial, item, layout)?;
                partial.end()?;
            }
            Ok(())
        }
        _ => match shape.ty {
            Type::User(UserType::Struct(ty)) => {
                let Json::Object(entries) = literal else {
                    return Err(DescriptorError::LiteralMismatch { expected: "object" });
                };
                let mut unused: BTreeSet<&str> = entries.keys().map(String::as_str).collect();
                write_record(partial, ty.fields, entries, &mut unused, layout)?;
                match unused.into_iter().next() {
                    Some(name) => Err(DescriptorError::UnknownField {
                        name: name.to_owned(),
                    }),
                    None => Ok(()),
                }
            }
            _ => Err(unsupported(shape)),
        },
    }
}

/// Fills a record from a JSON object. Flattened fields read from the same
/// object; fields the object does not name take their type's default.
fn write_record<'json>(
    partial: &mut Partial<'_>,
    fields: &'static [Field],
    entries: &'json Map<String, Json>,
    unused: &mut BTreeSet<&'json str>,
    layout: Option<&str>,
) -> Result<(), DescriptorError> {
    for (index, field) in fields.iter().enumerate() {
        partial.begin_nth_field(index)?;
        match field.shape().ty {
            Type::User(UserType::Struct(inner)) if attributes::is_flattened(field) => {
                write_record(partial, inner.fields, entries, unused, layout)?;
            }
            _ => match entries.get(field.name) {
                Some(item) => {
                    unused.remove(field.name);
                    let field_layout = attributes::layout(field);
                    write_literal(partial, item, field_layout.as_deref().or(layout))?;
                }
                None => {
                    if is_opaque_wrapper(field.shape()) {
                        return Err(unsupported(field.shape()));
                    }
                    partial.set_default()?;
                }
            },
        }
        partial.end()?;
    }
    Ok(())
}

fn unsupported(shape: &'static Shape) -> DescriptorError {
    DescriptorError::UnsupportedFieldType {
        type_name: shape.type_identifier,
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;

    #[facet_testhelpers::test]
    fn scalars_parse_against_their_type() {
        assert_eq!(
            parse_descriptor("-12", None, ScalarType::I16).unwrap(),
            Value::I16(-12)
        );
        assert_eq!(
            parse_descriptor("1h", None, ScalarType::Duration).unwrap(),
            Value::Duration(crate::Duration::from_hours(1))
        );
        assert!(matches!(
            parse_descriptor("300", None, ScalarType::U8),
            Err(DescriptorError::InvalidSyntax { target: "u8", .. })
        ));
    }

    #[facet_testhelpers::test]
    fn apply_writes_through_wrappers() {
        let mut port: Option<Box<u16>> = None;
        apply_descriptor(&mut port, "8080", None).unwrap();
        assert_eq!(port, Some(Box::new(8080)));

        let mut addr: SocketAddr = "0.0.0.0:1".parse().unwrap();
        apply_descriptor(&mut addr, "127.0.0.1:80", None).unwrap();
        assert_eq!(addr, "127.0.0.1:80".parse::<SocketAddr>().unwrap());

        let err = apply_descriptor(&mut addr, "localhost", None).unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::InvalidSyntax { target: "SocketAddr", .. }
        ));
        assert_eq!(addr, "127.0.0.1:80".parse::<SocketAddr>().unwrap());
    }
}
