//! Name scopes visible to documents.

use core::fmt;

use super::{Engine, Error, Lookup, Result};
use crate::record::Record;
use crate::runtime::namespace::ContextId;
use crate::values::{FromValue, ToValue, codec};

/// A scope of named values that documents created in it can see.
///
/// Contexts form a tree rooted at [`Engine::root_context`]. A lookup that
/// misses in a context continues in its parent.
#[derive(Clone)]
pub struct Context {
    id: ContextId,
    engine: Engine,
}

impl Context {
    pub(crate) fn new(id: ContextId, engine: Engine) -> Self {
        Context { id, engine }
    }

    pub(crate) fn id(&self) -> ContextId {
        self.id
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Bind `name` to `value` in this context, replacing a previous binding.
    pub fn set(&self, name: &str, value: impl ToValue) -> Result<()> {
        let value = value.to_value();
        let name = name.to_string();
        let id = self.id;
        self.engine.with_state(move |state| {
            let variant = codec::encode(state, value)?;
            if !state.namespaces.set(id, &name, variant) {
                return Err(Error::Closed);
            }
            Ok(())
        })
    }

    /// The value bound to `name` here or in an ancestor context.
    pub fn get(&self, name: &str) -> Result<crate::Value> {
        let name = name.to_string();
        let id = self.id;
        self.engine.with_state(move |state| {
            let variant = state
                .namespaces
                .get(id, &name)
                .cloned()
                .ok_or_else(|| Error::not_found(Lookup::Binding, name))?;
            codec::decode(state, &variant)
        })
    }

    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(self.get(name)?)
    }

    /// Bind every field of `record` under its binding name.
    ///
    /// Scalar fields are copied: later changes to `record` are not seen by
    /// the context. `Arc` and [`Object`](super::Object) fields bind the
    /// referenced value itself.
    pub fn expose<R: Record>(&self, record: &R) -> Result<()> {
        let bindings = R::descriptor().snapshot(record);
        let id = self.id;
        self.engine.with_state(move |state| {
            let mut encoded = Vec::with_capacity(bindings.len());
            for (name, value) in bindings {
                encoded.push((name, codec::encode(state, value)?));
            }
            for (name, variant) in encoded {
                if !state.namespaces.set(id, &name, variant) {
                    return Err(Error::Closed);
                }
            }
            Ok(())
        })
    }

    /// A new context whose lookups fall back to this one.
    pub fn spawn(&self) -> Result<Context> {
        let id = self.id;
        let child = self
            .engine
            .with_state(move |state| Ok(state.namespaces.create(Some(id))))?;
        Ok(Context::new(child, self.engine.clone()))
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.engine == other.engine
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context({}, {})", self.engine.id(), self.id)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
