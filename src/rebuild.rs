//! Copies a value into a [`Partial`] frame by frame, following its shape.
//!
//! Values held behind a shared reference cannot be written in place, so
//! every write in this crate rebuilds the value instead: a [`FieldPolicy`]
//! is offered each struct field on the way and may fill it itself.

use facet_core::{Def, Field, Shape, Type, UserType};
use facet_reflect::{Partial, Peek, ReflectError, VariantError};

use crate::{
    kind::{is_opaque_wrapper, pointee},
    value::Value,
};

/// Decides how struct fields are filled during a [`rebuild`].
pub trait FieldPolicy<'facet> {
    /// Fills `field`, whose frame is current in `partial` and whose value in
    /// the source is `source`. Returns `false` to have the field copied.
    fn write_field(
        &mut self,
        partial: &mut Partial<'facet>,
        field: &Field,
        source: Peek<'_, 'facet>,
    ) -> Result<bool, ReflectError>;
}

/// Copies every field as it is.
pub struct Verbatim;

impl<'facet> FieldPolicy<'facet> for Verbatim {
    fn write_field(
        &mut self,
        _partial: &mut Partial<'facet>,
        _field: &Field,
        _source: Peek<'_, 'facet>,
    ) -> Result<bool, ReflectError> {
        Ok(false)
    }
}

/// Writes a copy of `source` into the current frame of `partial`.
///
/// Fails on values that can be neither walked nor copied: sets,
/// `#[facet(opaque)]` fields and leaves that are not `Copy` and lack a
/// `Display`/`FromStr` pair.
pub fn rebuild<'facet, P>(
    partial: &mut Partial<'facet>,
    source: Peek<'_, 'facet>,
    policy: &mut P,
) -> Result<(), ReflectError>
where
    P: FieldPolicy<'facet> + ?Sized,
{
    let shape = source.shape();
    if let Some(value) = Value::from_peek(source) {
        return value.write(partial);
    }

    match shape.def {
        Def::Option(_) => {
            match source.into_option()?.value() {
                Some(inner) => {
                    partial.begin_some()?;
                    rebuild(partial, inner, policy)?;
                    partial.end()?;
                }
                None => {
                    partial.set_default()?;
                }
            }
            return Ok(());
        }
        Def::List(_) => {
            partial.begin_list()?;
            for item in source.into_list()?.iter() {
                partial.begin_list_item()?;
                rebuild(partial, item, policy)?;
                partial.end()?;
            }
            return Ok(());
        }
        Def::Array(_) => {
            for (index, item) in source.into_list_like()?.iter().enumerate() {
                partial.begin_nth_element(index)?;
                rebuild(partial, item, policy)?;
                partial.end()?;
            }
            return Ok(());
        }
        Def::Map(_) => {
            partial.begin_map()?;
            for (key, value) in source.into_map()?.iter() {
                partial.begin_key()?;
                rebuild(partial, key, &mut Verbatim)?;
                partial.end()?;
                partial.begin_value()?;
                rebuild(partial, value, policy)?;
                partial.end()?;
            }
            return Ok(());
        }
        Def::Pointer(_) if pointee(shape).is_some() => {
            let inner = source
                .into_pointer()?
                .borrow_inner()
                .ok_or(ReflectError::OperationFailed {
                    shape,
                    operation: "pointer target cannot be borrowed",
                })?;
            partial.begin_smart_ptr()?;
            rebuild(partial, inner, policy)?;
            partial.end()?;
            return Ok(());
        }
        _ => {}
    }

    match shape.ty {
        Type::User(UserType::Struct(ty)) if !ty.fields.is_empty() => {
            let record = source.into_struct()?;
            for (index, field) in ty.fields.iter().enumerate() {
                let value = record
                    .field(index)
                    .map_err(|field_error| ReflectError::FieldError { shape, field_error })?;
                partial.begin_nth_field(index)?;
                if !policy.write_field(partial, field, value)? {
                    rebuild(partial, value, policy)?;
                }
                partial.end()?;
            }
            Ok(())
        }
        Type::User(UserType::Enum(_)) => {
            let variants = source.into_enum()?;
            let variant = variants.active_variant().map_err(variant_error(shape))?;
            partial.select_variant_named(variant.name)?;
            for (index, field) in variant.data.fields.iter().enumerate() {
                let value = variants
                    .field(index)
                    .map_err(variant_error(shape))?
                    .ok_or(ReflectError::OperationFailed {
                        shape,
                        operation: "variant field cannot be read",
                    })?;
                partial.begin_nth_enum_field(index)?;
                if !policy.write_field(partial, field, value)? {
                    rebuild(partial, value, policy)?;
                }
                partial.end()?;
            }
            Ok(())
        }
        _ => copy_leaf(partial, source),
    }
}

fn copy_leaf<'facet>(
    partial: &mut Partial<'facet>,
    source: Peek<'_, 'facet>,
) -> Result<(), ReflectError> {
    let shape = source.shape();
    if is_opaque_wrapper(shape) {
        return Err(not_copyable(shape));
    }

    if shape.is_copy() {
        partial.set_from_peek(&source)?;
    } else if shape.vtable.has_display() && shape.vtable.has_parse() {
        partial.parse_from_str(&source.to_string())?;
    } else if matches!(shape.ty, Type::User(UserType::Struct(ty)) if ty.fields.is_empty()) {
        partial.set_default()?;
    } else {
        return Err(not_copyable(shape));
    }
    Ok(())
}

fn not_copyable(shape: &'static Shape) -> ReflectError {
    ReflectError::OperationFailed {
        shape,
        operation: "value cannot be copied",
    }
}

fn variant_error(shape: &'static Shape) -> impl Fn(VariantError) -> ReflectError {
    move |_| ReflectError::OperationFailed {
        shape,
        operation: "active variant cannot be read",
    }
}
