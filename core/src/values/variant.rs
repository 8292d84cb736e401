use core::fmt;

use ecow::EcoString;

use crate::runtime::heap::ObjectAddr;
use crate::values::Kind;

/// Key of a host record in the engine's host registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HostId(pub(crate) u64);

/// Engine-side value, as stored in property slots and context bindings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Variant {
    Null,
    Bool(bool),
    Int(isize),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(EcoString),
    Object(ObjectAddr),
    Host(HostId),
}

impl Variant {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Variant::Null => Kind::Null,
            Variant::Bool(_) => Kind::Bool,
            Variant::Int(_) => Kind::Int,
            Variant::Int32(_) => Kind::Int32,
            Variant::Int64(_) => Kind::Int64,
            Variant::Float32(_) => Kind::Float32,
            Variant::Float64(_) => Kind::Float64,
            Variant::String(_) => Kind::String,
            Variant::Object(_) => Kind::Object,
            Variant::Host(_) => Kind::Host,
        }
    }

    pub(crate) fn as_f64(&self) -> Option<f64> {
        match *self {
            Variant::Int(n) => Some(n as f64),
            Variant::Int32(n) => Some(n as f64),
            Variant::Int64(n) => Some(n as f64),
            Variant::Float32(n) => Some(n as f64),
            Variant::Float64(n) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn as_object(&self) -> Option<ObjectAddr> {
        match *self {
            Variant::Object(addr) => Some(addr),
            _ => None,
        }
    }

    /// Truthiness as used by `if`, `!`, `&&`, `||` and `?:`.
    pub(crate) fn truthy(&self) -> bool {
        match self {
            Variant::Null => false,
            Variant::Bool(b) => *b,
            Variant::String(s) => !s.is_empty(),
            Variant::Object(_) | Variant::Host(_) => true,
            number => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        }
    }

    /// The name reported by `typeof`-style diagnostics.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Variant::Null => "null",
            Variant::Bool(_) => "boolean",
            Variant::String(_) => "string",
            Variant::Object(_) | Variant::Host(_) => "object",
            _ => "number",
        }
    }
}

/// Script-facing text form, used for string concatenation and console output.
impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Null => write!(f, "null"),
            Variant::Bool(b) => write!(f, "{}", b),
            Variant::Int(n) => write!(f, "{}", n),
            Variant::Int32(n) => write!(f, "{}", n),
            Variant::Int64(n) => write!(f, "{}", n),
            Variant::Float32(n) => format_number(f, *n as f64),
            Variant::Float64(n) => format_number(f, *n),
            Variant::String(s) => f.write_str(s),
            Variant::Object(addr) => write!(f, "[object {}]", addr),
            Variant::Host(id) => write!(f, "[host {}]", id.0),
        }
    }
}

fn format_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == n.trunc() && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}
