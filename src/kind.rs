//! Sorts facet shapes into the kinds the walkers and the resolver tell apart.

use std::fmt::{self, Display};

use chrono::{DateTime, FixedOffset, Local, Utc};
use facet_core::{Def, KnownPointer, Shape, Type, UserType};
use facet_reflect::ScalarType as Primitive;

use crate::scalar::{Complex, Duration};

/// Classification of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Named, typed fields of fixed arity.
    Record,
    /// Ordered, 0-based indexable, homogeneous elements.
    Sequence,
    /// Keyed, homogeneous key and value types.
    Map,
    /// Zero-or-one wrapped value, collapsed by every walk.
    Optional,
    /// A leaf value.
    Scalar(ScalarType),
    /// A type that exposes no structure.
    Opaque,
}

impl Kind {
    /// Classifies `shape`. Smart pointers are transparent.
    pub fn of(shape: &'static Shape) -> Kind {
        if let Some(scalar_type) = ScalarType::of(shape) {
            return Kind::Scalar(scalar_type);
        }
        match shape.def {
            Def::Option(_) => return Kind::Optional,
            Def::List(_) | Def::Array(_) | Def::Slice(_) => return Kind::Sequence,
            Def::Map(_) => return Kind::Map,
            Def::Pointer(_) => {
                if let Some(pointee) = pointee(shape) {
                    return Kind::of(pointee);
                }
            }
            _ => {}
        }
        match shape.ty {
            Type::User(UserType::Struct(_)) => Kind::Record,
            _ => Kind::Opaque,
        }
    }

    /// Classifies `shape` after stripping optionals and smart pointers.
    pub fn leaf_of(shape: &'static Shape) -> Kind {
        Kind::of(leaf_shape(shape))
    }

    /// True for the kinds the defaults walker recurses into.
    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Record | Kind::Sequence | Kind::Map)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Record => write!(f, "record"),
            Kind::Sequence => write!(f, "sequence"),
            Kind::Map => write!(f, "map"),
            Kind::Optional => write!(f, "optional"),
            Kind::Scalar(scalar_type) => write!(f, "{scalar_type}"),
            Kind::Opaque => write!(f, "opaque"),
        }
    }
}

/// Every leaf type the descriptor parser and the resolver know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    ISize,
    U8,
    U16,
    U32,
    U64,
    U128,
    USize,
    F32,
    F64,
    /// [`Complex<f32>`].
    Complex32,
    /// [`Complex<f64>`].
    Complex64,
    Char,
    String,
    /// `chrono::DateTime` in `FixedOffset`, `Utc` or `Local`.
    Timestamp,
    /// [`Duration`], a signed span.
    Duration,
}

impl ScalarType {
    /// The scalar type `shape` holds, if it is one.
    pub fn of(shape: &'static Shape) -> Option<ScalarType> {
        if shape.is_type::<Complex<f32>>() {
            return Some(ScalarType::Complex32);
        }
        if shape.is_type::<Complex<f64>>() {
            return Some(ScalarType::Complex64);
        }
        if shape.is_type::<Duration>() {
            return Some(ScalarType::Duration);
        }
        if shape.is_type::<DateTime<FixedOffset>>()
            || shape.is_type::<DateTime<Utc>>()
            || shape.is_type::<DateTime<Local>>()
        {
            return Some(ScalarType::Timestamp);
        }

        let scalar_type = match Primitive::try_from_shape(shape)? {
            Primitive::Bool => ScalarType::Bool,
            Primitive::Char => ScalarType::Char,
            Primitive::String => ScalarType::String,
            Primitive::F32 => ScalarType::F32,
            Primitive::F64 => ScalarType::F64,
            Primitive::U8 => ScalarType::U8,
            Primitive::U16 => ScalarType::U16,
            Primitive::U32 => ScalarType::U32,
            Primitive::U64 => ScalarType::U64,
            Primitive::U128 => ScalarType::U128,
            Primitive::USize => ScalarType::USize,
            Primitive::I8 => ScalarType::I8,
            Primitive::I16 => ScalarType::I16,
            Primitive::I32 => ScalarType::I32,
            Primitive::I64 => ScalarType::I64,
            Primitive::I128 => ScalarType::I128,
            Primitive::ISize => ScalarType::ISize,
            _ => return None,
        };
        Some(scalar_type)
    }

    /// Rust spelling of the type, for messages.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::I128 => "i128",
            ScalarType::ISize => "isize",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::U128 => "u128",
            ScalarType::USize => "usize",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::Complex32 => "Complex<f32>",
            ScalarType::Complex64 => "Complex<f64>",
            ScalarType::Char => "char",
            ScalarType::String => "String",
            ScalarType::Timestamp => "DateTime",
            ScalarType::Duration => "Duration",
        }
    }

    /// Whether a map keyed by this type can be indexed by a path segment.
    pub fn is_key(self) -> bool {
        !matches!(
            self,
            ScalarType::Complex32
                | ScalarType::Complex64
                | ScalarType::Timestamp
                | ScalarType::Duration
        )
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The target of an owning or shared smart pointer.
pub(crate) fn pointee(shape: &'static Shape) -> Option<&'static Shape> {
    let Def::Pointer(def) = shape.def else {
        return None;
    };
    match def.known {
        Some(KnownPointer::Box | KnownPointer::Rc | KnownPointer::Arc) => def.pointee(),
        _ => None,
    }
}

/// `shape` with optionals and smart pointers stripped.
pub fn leaf_shape(shape: &'static Shape) -> &'static Shape {
    match shape.def {
        Def::Option(def) => leaf_shape(def.t),
        Def::Pointer(_) => pointee(shape).map_or(shape, leaf_shape),
        _ => shape,
    }
}

/// `#[facet(opaque)]` wrappers borrow the vtable of `()`: nothing may be
/// copied, defaulted or parsed through it.
pub(crate) fn is_opaque_wrapper(shape: &'static Shape) -> bool {
    matches!(shape.ty, Type::User(UserType::Opaque)) && shape.type_identifier == "Opaque"
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, net::SocketAddr, rc::Rc};

    use facet::Facet;

    use super::*;

    #[derive(Facet)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[facet_testhelpers::test]
    fn classifies_shapes() {
        assert_eq!(Kind::of(i32::SHAPE), Kind::Scalar(ScalarType::I32));
        assert_eq!(Kind::of(String::SHAPE), Kind::Scalar(ScalarType::String));
        assert_eq!(Kind::of(Duration::SHAPE), Kind::Scalar(ScalarType::Duration));
        assert_eq!(
            Kind::of(Complex::<f32>::SHAPE),
            Kind::Scalar(ScalarType::Complex32)
        );
        assert_eq!(
            Kind::of(DateTime::<Utc>::SHAPE),
            Kind::Scalar(ScalarType::Timestamp)
        );
        assert_eq!(Kind::of(Point::SHAPE), Kind::Record);
        assert_eq!(Kind::of(Vec::<Point>::SHAPE), Kind::Sequence);
        assert_eq!(Kind::of(<[u8; 4]>::SHAPE), Kind::Sequence);
        assert_eq!(Kind::of(HashMap::<String, i32>::SHAPE), Kind::Map);
        assert_eq!(Kind::of(Option::<Point>::SHAPE), Kind::Optional);
        assert_eq!(Kind::of(SocketAddr::SHAPE), Kind::Opaque);
    }

    #[facet_testhelpers::test]
    fn pointers_and_optionals_are_stripped() {
        assert_eq!(Kind::of(Box::<Point>::SHAPE), Kind::Record);
        assert_eq!(Kind::of(Rc::<u8>::SHAPE), Kind::Scalar(ScalarType::U8));
        assert_eq!(Kind::leaf_of(Option::<Box<Point>>::SHAPE), Kind::Record);
        assert!(leaf_shape(Option::<Option<i64>>::SHAPE).is_type::<i64>());
    }

    #[facet_testhelpers::test]
    fn only_containers_are_composite() {
        assert!(Kind::Record.is_composite());
        assert!(Kind::Sequence.is_composite());
        assert!(Kind::Map.is_composite());
        assert!(!Kind::Optional.is_composite());
        assert!(!Kind::Opaque.is_composite());
        assert!(!Kind::Scalar(ScalarType::Bool).is_composite());
        assert_eq!(Kind::Scalar(ScalarType::Complex64).to_string(), "Complex<f64>");
    }
}
