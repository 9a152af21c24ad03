//! Typed copies of resolved and parsed values.

use std::fmt::{self, Debug};

use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};
use facet_core::Facet;
use facet_reflect::{HeapValue, Partial, Peek, ReflectError};

use crate::{
    kind::ScalarType,
    scalar::{Complex, Duration},
};

/// A typed scalar, owned.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    ISize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    USize(usize),
    F32(f32),
    F64(f64),
    Complex32(Complex<f32>),
    Complex64(Complex<f64>),
    Char(char),
    String(String),
    /// A sequence of bytes, copied out of a `Vec<u8>` or `[u8; N]`.
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    Duration(Duration),
}

impl Value {
    /// Name of the variant's Rust type, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::I128(_) => "i128",
            Value::ISize(_) => "isize",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::USize(_) => "usize",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Complex32(_) => "Complex<f32>",
            Value::Complex64(_) => "Complex<f64>",
            Value::Char(_) => "char",
            Value::String(_) => "String",
            Value::Bytes(_) => "Vec<u8>",
            Value::Timestamp(_) => "DateTime",
            Value::Duration(_) => "Duration",
        }
    }

    /// Copies the scalar `peek` points at. Timestamps in any zone come out
    /// with their offset fixed.
    pub fn from_peek<'facet>(peek: Peek<'_, 'facet>) -> Option<Value> {
        let value = match ScalarType::of(peek.shape())? {
            ScalarType::Bool => Value::Bool(copied(peek)?),
            ScalarType::I8 => Value::I8(copied(peek)?),
            ScalarType::I16 => Value::I16(copied(peek)?),
            ScalarType::I32 => Value::I32(copied(peek)?),
            ScalarType::I64 => Value::I64(copied(peek)?),
            ScalarType::I128 => Value::I128(copied(peek)?),
            ScalarType::ISize => Value::ISize(copied(peek)?),
            ScalarType::U8 => Value::U8(copied(peek)?),
            ScalarType::U16 => Value::U16(copied(peek)?),
            ScalarType::U32 => Value::U32(copied(peek)?),
            ScalarType::U64 => Value::U64(copied(peek)?),
            ScalarType::U128 => Value::U128(copied(peek)?),
            ScalarType::USize => Value::USize(copied(peek)?),
            ScalarType::F32 => Value::F32(copied(peek)?),
            ScalarType::F64 => Value::F64(copied(peek)?),
            ScalarType::Complex32 => Value::Complex32(copied(peek)?),
            ScalarType::Complex64 => Value::Complex64(copied(peek)?),
            ScalarType::Char => Value::Char(copied(peek)?),
            ScalarType::String => Value::String(peek.get::<String>().ok()?.clone()),
            ScalarType::Duration => Value::Duration(copied(peek)?),
            ScalarType::Timestamp => {
                if let Ok(timestamp) = peek.get::<DateTime<FixedOffset>>() {
                    Value::Timestamp(*timestamp)
                } else if let Ok(timestamp) = peek.get::<DateTime<Utc>>() {
                    Value::Timestamp(timestamp.fixed_offset())
                } else {
                    Value::Timestamp(peek.get::<DateTime<Local>>().ok()?.fixed_offset())
                }
            }
        };
        Some(value)
    }

    /// Writes the value into the current frame of `partial`. Timestamps
    /// are converted to the frame's zone.
    pub fn write(self, partial: &mut Partial<'_>) -> Result<(), ReflectError> {
        match self {
            Value::Bool(v) => partial.set(v)?,
            Value::I8(v) => partial.set(v)?,
            Value::I16(v) => partial.set(v)?,
            Value::I32(v) => partial.set(v)?,
            Value::I64(v) => partial.set(v)?,
            Value::I128(v) => partial.set(v)?,
            Value::ISize(v) => partial.set(v)?,
            Value::U8(v) => partial.set(v)?,
            Value::U16(v) => partial.set(v)?,
            Value::U32(v) => partial.set(v)?,
            Value::U64(v) => partial.set(v)?,
            Value::U128(v) => partial.set(v)?,
            Value::USize(v) => partial.set(v)?,
            Value::F32(v) => partial.set(v)?,
            Value::F64(v) => partial.set(v)?,
            Value::Complex32(v) => partial.set(v)?,
            Value::Complex64(v) => partial.set(v)?,
            Value::Char(v) => partial.set(v)?,
            Value::String(v) => partial.set(v)?,
            Value::Bytes(v) => partial.set(v)?,
            Value::Duration(v) => partial.set(v)?,
            Value::Timestamp(v) => {
                let shape = partial.shape();
                if shape.is_type::<DateTime<Utc>>() {
                    partial.set(v.with_timezone(&Utc))?
                } else if shape.is_type::<DateTime<Local>>() {
                    partial.set(v.with_timezone(&Local))?
                } else {
                    partial.set(v)?
                }
            }
        };
        Ok(())
    }
}

fn copied<'facet, T: Facet<'facet> + Copy>(peek: Peek<'_, 'facet>) -> Option<T> {
    peek.get::<T>().ok().copied()
}

/// Result of resolving a path: a scalar copy or a copy of a composite.
pub enum Resolved<'facet> {
    /// A scalar, byte sequence, timestamp or duration.
    Value(Value),
    /// Any other value, rebuilt on the heap from its shape.
    Composite(HeapValue<'facet>),
}

impl<'facet> Resolved<'facet> {
    /// The scalar, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(value) => Some(value),
            Resolved::Composite(_) => None,
        }
    }

    /// The scalar, if this is one.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Value(value) => Some(value),
            Resolved::Composite(_) => None,
        }
    }

    /// Recovers a composite copy as its concrete type.
    pub fn downcast<T: Facet<'facet>>(self) -> Option<T> {
        match self {
            Resolved::Composite(composite) => composite.materialize().ok(),
            Resolved::Value(_) => None,
        }
    }

    /// Name of the resolved type, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Resolved::Value(value) => value.type_name(),
            Resolved::Composite(composite) => composite.shape().type_identifier,
        }
    }
}

impl Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolved::Composite(composite) => f
                .debug_tuple("Composite")
                .field(&composite.shape().type_identifier)
                .finish(),
        }
    }
}

/// Types that [`get_as`](crate::get_as) can extract from a [`Value`].
pub trait FromValue: Sized {
    /// Name of the type, for mismatch errors.
    const TYPE_NAME: &'static str;

    /// Converts, handing the value back on mismatch.
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => ISize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => USize,
    f32 => F32,
    f64 => F64,
    Complex<f32> => Complex32,
    Complex<f64> => Complex64,
    char => Char,
    String => String,
    Vec<u8> => Bytes,
    DateTime<FixedOffset> => Timestamp,
    Duration => Duration,
}

impl FromValue for DateTime<Utc> {
    const TYPE_NAME: &'static str = "DateTime<Utc>";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Timestamp(timestamp) => Ok(timestamp.with_timezone(&Utc)),
            other => Err(other),
        }
    }
}

impl FromValue for TimeDelta {
    const TYPE_NAME: &'static str = "TimeDelta";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Duration(duration) => Ok(duration.into()),
            other => Err(other),
        }
    }
}

impl FromValue for std::time::Duration {
    const TYPE_NAME: &'static str = "std::time::Duration";

    /// Negative spans do not convert.
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Duration(duration) => duration.try_into().map_err(Value::Duration),
            other => Err(other),
        }
    }
}
