//! Conversion between [`Value`] and [`Variant`].
//!
//! Both directions run on the engine thread: object handles are resolved
//! through the handle registry and host records through the host registry.
//! Scalars map one to one and keep their exact kind.

use crate::api::Error;
use crate::runtime::state::State;
use crate::values::{Value, Variant};

pub(crate) fn encode(state: &mut State, value: Value) -> Result<Variant, Error> {
    Ok(match value {
        Value::Null => Variant::Null,
        Value::Bool(b) => Variant::Bool(b),
        Value::Int(n) => Variant::Int(n),
        Value::Int32(n) => Variant::Int32(n),
        Value::Int64(n) => Variant::Int64(n),
        Value::Float32(n) => Variant::Float32(n),
        Value::Float64(n) => Variant::Float64(n),
        Value::String(s) => Variant::String(s.into()),
        Value::Object(object) => {
            if object.engine_id() != state.engine_id {
                return Err(Error::ForeignObject);
            }
            let addr = object.addr();
            if !state.heap.contains(addr) {
                return Err(Error::Destroyed(addr));
            }
            Variant::Object(addr)
        }
        Value::Host(host) => Variant::Host(state.hosts.register(host)),
    })
}

/// Decode a stored value. References to destroyed objects read as null.
pub(crate) fn decode(state: &mut State, variant: &Variant) -> Result<Value, Error> {
    Ok(match variant {
        Variant::Null => Value::Null,
        Variant::Bool(b) => Value::Bool(*b),
        Variant::Int(n) => Value::Int(*n),
        Variant::Int32(n) => Value::Int32(*n),
        Variant::Int64(n) => Value::Int64(*n),
        Variant::Float32(n) => Value::Float32(*n),
        Variant::Float64(n) => Value::Float64(*n),
        Variant::String(s) => Value::String(s.to_string()),
        Variant::Object(addr) if state.heap.contains(*addr) => Value::Object(state.wrap(*addr)?),
        Variant::Object(_) => Value::Null,
        Variant::Host(id) => match state.hosts.get(*id) {
            Some(host) => Value::Host(host.clone()),
            None => Value::Null,
        },
    })
}
