//! Handles to native objects.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use super::engine::EngineShared;
use super::{Engine, EngineId, Error, Lookup, Result};
use crate::evaluator::Args;
use crate::runtime::heap::ObjectAddr;
use crate::values::{FromValue, ToValue, Value, Variant, codec};

pub(crate) struct ObjectInner {
    addr: ObjectAddr,
    engine_id: EngineId,
    engine: Weak<EngineShared>,
}

impl ObjectInner {
    pub(crate) fn new(addr: ObjectAddr, engine_id: EngineId, engine: Weak<EngineShared>) -> Self {
        ObjectInner {
            addr,
            engine_id,
            engine,
        }
    }
}

/// A handle to a native object living on the engine thread.
///
/// The handle owns neither the object nor the engine: it stops working with
/// [`Error::Destroyed`] once the object is destroyed and with
/// [`Error::Closed`] once the engine is closed or its last [`Engine`] handle
/// is dropped. Two handles are equal when they refer to the same object of
/// the same engine.
#[derive(Clone)]
pub struct Object {
    inner: Arc<ObjectInner>,
}

impl Object {
    pub(crate) fn from_inner(inner: Arc<ObjectInner>) -> Self {
        Object { inner }
    }

    pub fn addr(&self) -> ObjectAddr {
        self.inner.addr
    }

    pub fn engine_id(&self) -> EngineId {
        self.inner.engine_id
    }

    /// The engine owning the object, unless it has shut down.
    pub fn engine(&self) -> Option<Engine> {
        let engine = Engine::from_shared(self.inner.engine.upgrade()?);
        (!engine.is_closed()).then_some(engine)
    }

    fn live_engine(&self) -> Result<Engine> {
        self.engine().ok_or(Error::Closed)
    }

    #[cfg(test)]
    pub(crate) fn shares_handle(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Name of the object's type as written in the document that created it.
    pub fn type_name(&self) -> Result<String> {
        let addr = self.addr();
        self.live_engine()?
            .with_state(move |state| Ok(state.heap.get(addr)?.type_name.to_string()))
    }

    pub fn property(&self, name: &str) -> Result<Value> {
        let addr = self.addr();
        let name = name.to_string();
        self.live_engine()?.with_state(move |state| {
            let variant = state.read_property(addr, &name)?;
            codec::decode(state, &variant)
        })
    }

    pub fn property_as<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(self.property(name)?)
    }

    /// Every property with its current value: the type's properties first,
    /// then those declared by documents, each in declaration order.
    pub fn properties(&self) -> Result<Vec<(String, Value)>> {
        let addr = self.addr();
        self.live_engine()?.with_state(move |state| {
            let slots: Vec<_> = state
                .heap
                .get(addr)?
                .slots()
                .iter()
                .map(|slot| (slot.name.to_string(), slot.value.clone()))
                .collect();
            slots
                .into_iter()
                .map(|(name, variant)| Ok((name, codec::decode(state, &variant)?)))
                .collect()
        })
    }

    /// Write property `name`, converting `value` to the property's kind.
    pub fn set_property(&self, name: &str, value: impl ToValue) -> Result<()> {
        let addr = self.addr();
        let name = name.to_string();
        let value = value.to_value();
        self.live_engine()?.with_state(move |state| {
            let variant = codec::encode(state, value)?;
            state.write_property(addr, &name, variant)
        })
    }

    /// Queue a property write without waiting for it.
    ///
    /// Writes queued from one thread apply in order. Failures are logged.
    pub fn set_property_async(&self, name: &str, value: impl ToValue) -> Result<()> {
        let addr = self.addr();
        let name = name.to_string();
        let value = value.to_value();
        self.live_engine()?.with_state_async(move |state| {
            let variant = codec::encode(state, value)?;
            state.write_property(addr, &name, variant)
        })
    }

    /// Call a method of the object's native type or a `function` declared by
    /// the document that created it.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let addr = self.addr();
        let method = method.to_string();
        let args = args.to_vec();
        self.live_engine()?.with_state(move |state| {
            let mut encoded = Args::new();
            for arg in args {
                encoded.push(codec::encode(state, arg)?);
            }
            let result = state.invoke(addr, &method, &encoded)?;
            codec::decode(state, &result)
        })
    }

    pub fn parent(&self) -> Result<Option<Object>> {
        let addr = self.addr();
        self.live_engine()?.with_state(move |state| {
            let parent = state.heap.get(addr)?.parent;
            parent.map(|parent| state.wrap(parent)).transpose()
        })
    }

    pub fn children(&self) -> Result<Vec<Object>> {
        let addr = self.addr();
        self.live_engine()?.with_state(move |state| {
            let children = state.heap.get(addr)?.children.clone();
            children.into_iter().map(|child| state.wrap(child)).collect()
        })
    }

    /// The first descendant, depth first, whose `objectName` is `name`.
    pub fn object_by_name(&self, name: &str) -> Result<Object> {
        let addr = self.addr();
        let name = name.to_string();
        self.live_engine()?.with_state(move |state| {
            let mut pending: Vec<ObjectAddr> = state.heap.get(addr)?.children.clone();
            pending.reverse();
            while let Some(next) = pending.pop() {
                let object = state.heap.get(next)?;
                let matches = matches!(
                    object.slot("objectName").map(|slot| &slot.value),
                    Some(Variant::String(s)) if s.as_str() == name
                );
                if matches {
                    return state.wrap(next);
                }
                pending.extend(object.children.iter().rev());
            }
            Err(Error::not_found(Lookup::Object, name))
        })
    }

    /// Destroy the object and its children.
    pub fn destroy(&self) -> Result<()> {
        let addr = self.addr();
        self.live_engine()?
            .with_state(move |state| state.destroy_object(addr))
    }

    /// Whether the native object still exists.
    pub fn is_alive(&self) -> bool {
        let addr = self.addr();
        self.live_engine()
            .and_then(|engine| engine.with_state(move |state| Ok(state.heap.contains(addr))))
            .unwrap_or(false)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr() && self.engine_id() == other.engine_id()
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.engine_id().hash(state);
        self.addr().hash(state);
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({}, {})", self.engine_id(), self.addr())
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]", self.addr())
    }
}

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;
