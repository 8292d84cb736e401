use core::fmt;

use crate::values::Variant;

/// The exact tag of a [`Value`](crate::Value).
///
/// Integer and float widths are distinct kinds: a value stored as
/// [`Kind::Float32`] never reads back as [`Kind::Float64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    /// Native word width (`isize`).
    Int,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    /// A native engine object.
    Object,
    /// An opaque host record.
    Host,
}

impl Kind {
    pub fn is_integer(self) -> bool {
        matches!(self, Kind::Int | Kind::Int32 | Kind::Int64)
    }

    pub fn is_number(self) -> bool {
        self.is_integer() || matches!(self, Kind::Float32 | Kind::Float64)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::Object => "object",
            Kind::Host => "host",
        };
        f.write_str(name)
    }
}

/// The declared kind of a native property slot.
///
/// Unlike [`Kind`] this is a storage contract: a slot of kind `Real` accepts
/// any number and stores it as `Float64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PropertyKind {
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit float.
    Real,
    String,
    /// Any value, stored as given.
    Var,
    /// Object reference or null.
    Object,
}

impl PropertyKind {
    /// Parse a declaration keyword (`property int count`).
    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "bool" => Some(PropertyKind::Bool),
            "int" => Some(PropertyKind::Int),
            "real" | "double" => Some(PropertyKind::Real),
            "string" => Some(PropertyKind::String),
            "var" | "variant" => Some(PropertyKind::Var),
            _ => None,
        }
    }

    pub(crate) fn default_value(self) -> Variant {
        match self {
            PropertyKind::Bool => Variant::Bool(false),
            PropertyKind::Int => Variant::Int32(0),
            PropertyKind::Real => Variant::Float64(0.0),
            PropertyKind::String => Variant::String("".into()),
            PropertyKind::Var | PropertyKind::Object => Variant::Null,
        }
    }

    /// Store `value` in a slot of this kind.
    ///
    /// Returns the value unchanged in `Err` when it cannot be represented.
    pub(crate) fn coerce(self, value: Variant) -> Result<Variant, Variant> {
        match (self, value) {
            (PropertyKind::Var, value) => Ok(value),
            (PropertyKind::Bool, value @ Variant::Bool(_)) => Ok(value),
            (PropertyKind::String, value @ Variant::String(_)) => Ok(value),
            (PropertyKind::Object, value @ (Variant::Object(_) | Variant::Null)) => Ok(value),
            (PropertyKind::Real, value) => match value.as_f64() {
                Some(number) => Ok(Variant::Float64(number)),
                None => Err(value),
            },
            (PropertyKind::Int, value) => match value {
                Variant::Int(n) => i32::try_from(n).map(Variant::Int32).map_err(|_| value),
                Variant::Int32(n) => Ok(Variant::Int32(n)),
                Variant::Int64(n) => i32::try_from(n).map(Variant::Int32).map_err(|_| value),
                Variant::Float32(_) | Variant::Float64(_) => match value.as_f64() {
                    // Truncation toward zero, like the document language's int conversion.
                    Some(number)
                        if number.is_finite()
                            && number.trunc() >= i32::MIN as f64
                            && number.trunc() <= i32::MAX as f64 =>
                    {
                        Ok(Variant::Int32(number as i32))
                    }
                    _ => Err(value),
                },
                other => Err(other),
            },
            (_, value) => Err(value),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "int",
            PropertyKind::Real => "real",
            PropertyKind::String => "string",
            PropertyKind::Var => "var",
            PropertyKind::Object => "object",
        };
        f.write_str(name)
    }
}
