//! Resolves a [`Path`] against a value and copies out what it addresses.

use facet_core::{Def, Shape};
use facet_reflect::{Partial, Peek};

use crate::{
    attributes,
    descriptor::parse_descriptor,
    kind::{Kind, ScalarType, pointee},
    path::{Path, PathError, PathErrorKind},
    rebuild::{Verbatim, rebuild},
    value::{Resolved, Value},
};

/// Resolves `path` against `root`.
///
/// Returns `Ok(None)` when the path ends at an unset optional value.
pub fn resolve<'facet>(
    root: Peek<'_, 'facet>,
    path: &Path,
) -> Result<Option<Resolved<'facet>>, PathError> {
    log::trace!("Resolving path {path} against {}", root.shape());

    let mut current = root;
    let mut elements = path.elements();
    loop {
        let shape = current.shape();
        if let Def::Option(_) = shape.def {
            let inner = current
                .into_option()
                .map_err(|_| not_accessible(shape))?
                .value();
            match inner {
                Some(inner) => {
                    current = inner;
                    continue;
                }
                None => {
                    return match elements.first() {
                        None => Ok(None),
                        Some(segment) => Err(PathErrorKind::PathTooLong(segment.clone()).into()),
                    };
                }
            }
        }
        if pointee(shape).is_some() {
            current = current
                .into_pointer()
                .ok()
                .and_then(|pointer| pointer.borrow_inner())
                .ok_or_else(|| not_accessible(shape))?;
            continue;
        }

        let Some((segment, rest)) = elements.split_first() else {
            return copy_out(current);
        };

        let child = match Kind::of(shape) {
            Kind::Record => find_field(current, segment),
            Kind::Sequence => {
                let sequence = current
                    .into_list_like()
                    .map_err(|_| not_accessible(shape))?;
                parse_index(segment).and_then(|index| sequence.get(index))
            }
            Kind::Map => lookup(current, segment)?,
            Kind::Optional | Kind::Scalar(_) | Kind::Opaque => {
                return Err(PathErrorKind::PathTooLong(segment.clone()).into());
            }
        };
        let child = child.ok_or_else(|| PathErrorKind::SegmentNotFound(segment.clone()))?;

        log::trace!("Segment {segment:?} resolved to {}", child.shape());
        current = child;
        elements = rest;
    }
}

/// Finds a field by its effective name, then inside flattened fields.
fn find_field<'mem, 'facet>(record: Peek<'mem, 'facet>, name: &str) -> Option<Peek<'mem, 'facet>> {
    let record = record.into_struct().ok()?;
    if let Ok(field) = record.field_by_name(name) {
        return Some(field);
    }
    record
        .ty()
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| attributes::is_flattened(field))
        .filter_map(|(index, _)| record.field(index).ok())
        .find_map(|flattened| find_field(flattened, name))
}

/// Reads a sequence index as an optional sign followed by ASCII digits.
/// `-0` is index 0; any other negative index matches nothing.
fn parse_index(segment: &str) -> Option<usize> {
    let (negative, digits) = match segment.as_bytes().first() {
        Some(b'-') => (true, &segment[1..]),
        Some(b'+') => (false, &segment[1..]),
        _ => (false, segment),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: usize = digits.parse().ok()?;
    if negative && index != 0 {
        return None;
    }
    Some(index)
}

fn lookup<'mem, 'facet>(
    map: Peek<'mem, 'facet>,
    segment: &str,
) -> Result<Option<Peek<'mem, 'facet>>, PathError> {
    let shape = map.shape();
    let map = map.into_map().map_err(|_| not_accessible(shape))?;
    let key_shape = map.def().k();
    let Some(key_type) = ScalarType::of(key_shape).filter(|key_type| key_type.is_key()) else {
        return Err(PathErrorKind::UnsupportedKeyType(Kind::of(key_shape)).into());
    };

    // a segment that does not convert to the key type matches no key
    let Ok(key) = parse_descriptor(segment, None, key_type) else {
        return Ok(None);
    };
    // the key was parsed as the map's own key type
    let value = match key {
        Value::Bool(key) => map.get(&key),
        Value::I8(key) => map.get(&key),
        Value::I16(key) => map.get(&key),
        Value::I32(key) => map.get(&key),
        Value::I64(key) => map.get(&key),
        Value::I128(key) => map.get(&key),
        Value::ISize(key) => map.get(&key),
        Value::U8(key) => map.get(&key),
        Value::U16(key) => map.get(&key),
        Value::U32(key) => map.get(&key),
        Value::U64(key) => map.get(&key),
        Value::U128(key) => map.get(&key),
        Value::USize(key) => map.get(&key),
        Value::F32(key) => map.get(&key),
        Value::F64(key) => map.get(&key),
        Value::Char(key) => map.get(&key),
        Value::String(key) => map.get(&key),
        Value::Complex32(_)
        | Value::Complex64(_)
        | Value::Bytes(_)
        | Value::Timestamp(_)
        | Value::Duration(_) => None,
    };
    Ok(value)
}

fn copy_out<'facet>(value: Peek<'_, 'facet>) -> Result<Option<Resolved<'facet>>, PathError> {
    if let Some(scalar) = Value::from_peek(value) {
        return Ok(Some(Resolved::Value(scalar)));
    }
    if let Ok(sequence) = value.into_list_like() {
        if sequence.def().t().is_type::<u8>() {
            let bytes = sequence
                .iter()
                .filter_map(|byte| byte.get::<u8>().ok().copied())
                .collect();
            return Ok(Some(Resolved::Value(Value::Bytes(bytes))));
        }
    }

    let shape = value.shape();
    let mut partial = Partial::alloc_shape(shape).map_err(|_| not_accessible(shape))?;
    if let Err(error) = rebuild(&mut partial, value, &mut Verbatim) {
        log::debug!("Cannot copy {shape}: {error}");
        return Err(not_accessible(shape));
    }
    let copy = partial.build().map_err(|_| not_accessible(shape))?;
    Ok(Some(Resolved::Composite(copy)))
}

fn not_accessible(shape: &'static Shape) -> PathError {
    PathErrorKind::NotAccessible(shape.type_identifier).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[facet_testhelpers::test]
    fn indices_take_an_optional_sign() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("+3"), Some(3));
        assert_eq!(parse_index("-0"), Some(0));
        assert_eq!(parse_index("007"), Some(7));
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("+"), None);
        assert_eq!(parse_index("-"), None);
        assert_eq!(parse_index("1e3"), None);
        assert_eq!(parse_index("+-1"), None);
        assert_eq!(parse_index("99999999999999999999999"), None);
    }
}
