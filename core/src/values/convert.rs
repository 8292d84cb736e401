//! Conversions between Rust types and [`Value`].
//!
//! Conversions are exact: an `i32` becomes [`Value::Int32`] and only an
//! [`Value::Int32`] converts back into an `i32`. Widening or narrowing is the
//! caller's business.

use std::sync::Arc;

use crate::api::{Error, Object};
use crate::values::{HostObject, HostRef, Kind, Value};

pub trait ToValue {
    /// The kind every value of this type converts to, when it is fixed.
    const KIND: Option<Kind>;

    fn to_value(&self) -> Value;
}

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, Error>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToValue for $ty {
                const KIND: Option<Kind> = Some(Kind::$variant);

                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, Error> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(Error::mismatch(Kind::$variant, other.kind())),
                    }
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    isize => Int,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
}

impl ToValue for String {
    const KIND: Option<Kind> = Some(Kind::String);

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for str {
    const KIND: Option<Kind> = Some(Kind::String);

    fn to_value(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::mismatch(Kind::String, other.kind())),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    const KIND: Option<Kind> = T::KIND;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for Value {
    const KIND: Option<Kind> = None;

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value)
    }
}

impl ToValue for Object {
    const KIND: Option<Kind> = Some(Kind::Object);

    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl FromValue for Object {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(object) => Ok(object),
            other => Err(Error::mismatch(Kind::Object, other.kind())),
        }
    }
}

impl ToValue for HostRef {
    const KIND: Option<Kind> = Some(Kind::Host);

    fn to_value(&self) -> Value {
        Value::Host(self.clone())
    }
}

impl FromValue for HostRef {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Host(host) => Ok(host),
            other => Err(Error::mismatch(Kind::Host, other.kind())),
        }
    }
}

impl<T: HostObject> ToValue for Arc<T> {
    const KIND: Option<Kind> = Some(Kind::Host);

    fn to_value(&self) -> Value {
        Value::Host(HostRef::new(self.clone()))
    }
}

impl<T: HostObject> FromValue for Arc<T> {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Host(host) => host
                .downcast::<T>()
                .ok_or_else(|| Error::mismatch(core::any::type_name::<T>(), host.type_name())),
            other => Err(Error::mismatch(Kind::Host, other.kind())),
        }
    }
}

/// `None` maps to [`Value::Null`]. This is the only way to read a null.
impl<T: ToValue> ToValue for Option<T> {
    const KIND: Option<Kind> = None;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

macro_rules! impl_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.to_value()
                }
            }
        )*
    };
}

impl_from!(bool, isize, i32, i64, f32, f64, String, Object, HostRef);
