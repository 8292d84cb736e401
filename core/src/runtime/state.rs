//! Engine state owned by the engine thread.
//!
//! The state lives in a thread local of the engine thread and is only reached
//! through [`with`]. Nothing in it is `Send`-guarded or locked: the dispatcher
//! guarantees that every access happens on that one thread.

use core::cell::RefCell;
use std::sync::{Arc, Weak};

use hashbrown::HashMap;

use crate::api::engine::EngineShared;
use crate::api::object::ObjectInner;
use crate::api::{EngineId, EngineOptions, Error, Lookup, Object};
use crate::compiler::DocumentCache;
use crate::evaluator::Evaluator;
use crate::logging::{LogLevel, LogMessage};
use crate::runtime::heap::{BoundFunction, Heap, ObjectAddr};
use crate::runtime::namespace::{ContextId, Namespaces};
use crate::runtime::types::MethodInfo;
use crate::values::{HostId, HostRef, Variant};

thread_local! {
    static STATE: RefCell<Option<State>> = const { RefCell::new(None) };
}

/// Make `state` the engine state of the current thread.
pub(crate) fn install(state: State) {
    STATE.with(|cell| *cell.borrow_mut() = Some(state));
}

/// Take the engine state out of the current thread.
pub(crate) fn uninstall() -> Option<State> {
    STATE.with(|cell| cell.borrow_mut().take())
}

/// Run `f` against the engine state of the current thread.
///
/// Fails with [`Error::Closed`] when no state is installed, which is the case
/// on every thread but the engine thread and after teardown.
///
/// # Panics
///
/// Panics when called while the state is already borrowed, e.g. from a
/// [`HostObject::field`](crate::HostObject::field) implementation that calls
/// back into the engine.
pub(crate) fn with<R>(f: impl FnOnce(&mut State) -> Result<R, Error>) -> Result<R, Error> {
    STATE.with(|cell| {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            panic!("re-entrant access to engine state");
        };
        match guard.as_mut() {
            Some(state) => f(state),
            None => Err(Error::Closed),
        }
    })
}

/// Something a document can call on an object.
#[derive(Debug, Clone)]
pub(crate) enum Callable {
    Native(MethodInfo),
    Function(BoundFunction),
}

/// Host records placed in the engine, keyed by allocation.
///
/// A record keeps the same id for the lifetime of the engine, so decoding
/// returns a reference to the very allocation that was encoded. Entries are
/// never removed: every record stays alive until the engine state is torn
/// down, even after no binding or property refers to it any more.
#[derive(Debug, Default)]
pub(crate) struct HostRegistry {
    by_id: HashMap<HostId, HostRef>,
    by_addr: HashMap<usize, HostId>,
    next: u64,
}

impl HostRegistry {
    pub(crate) fn register(&mut self, host: HostRef) -> HostId {
        if let Some(id) = self.by_addr.get(&host.addr()) {
            return *id;
        }
        self.next += 1;
        let id = HostId(self.next);
        self.by_addr.insert(host.addr(), id);
        self.by_id.insert(id, host);
        id
    }

    pub(crate) fn get(&self, id: HostId) -> Option<&HostRef> {
        self.by_id.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}

pub(crate) struct State {
    engine: Weak<EngineShared>,
    pub engine_id: EngineId,
    pub options: EngineOptions,
    pub heap: Heap,
    pub namespaces: Namespaces,
    pub documents: DocumentCache,
    pub hosts: HostRegistry,
    /// Live handles, deduplicated per address.
    handles: HashMap<ObjectAddr, Weak<ObjectInner>>,
    /// Size of `handles` after the last sweep of dead entries.
    swept: usize,
    /// Document contexts created for an instance root, dropped with it.
    pub instances: HashMap<ObjectAddr, Vec<ContextId>>,
    logs: Vec<LogMessage>,
}

impl State {
    pub(crate) fn new(engine: Weak<EngineShared>, engine_id: EngineId, options: EngineOptions) -> Self {
        State {
            engine,
            engine_id,
            options,
            heap: Heap::default(),
            namespaces: Namespaces::new(),
            documents: DocumentCache::default(),
            hosts: HostRegistry::default(),
            handles: HashMap::new(),
            swept: 0,
            instances: HashMap::new(),
            logs: Vec::new(),
        }
    }

    /// The handle for `addr`, reusing a live one when it exists.
    pub(crate) fn wrap(&mut self, addr: ObjectAddr) -> Result<Object, Error> {
        if let Some(inner) = self.handles.get(&addr).and_then(Weak::upgrade) {
            return Ok(Object::from_inner(inner));
        }
        let inner = Arc::new(ObjectInner::new(addr, self.engine_id, self.engine.clone()));
        self.handles.insert(addr, Arc::downgrade(&inner));

        if self.handles.len() > 2 * self.swept.max(32) {
            self.handles.retain(|_, weak| weak.strong_count() > 0);
            self.swept = self.handles.len();
        }
        Ok(Object::from_inner(inner))
    }

    pub(crate) fn log(&mut self, message: LogMessage) {
        self.logs.push(message);
    }

    pub(crate) fn warn(&mut self, identifier: &str, line: usize, text: String) {
        self.log(LogMessage {
            level: LogLevel::Warning,
            identifier: identifier.to_string(),
            line,
            text,
        });
    }

    /// Messages logged since the last call, oldest first.
    pub(crate) fn take_logs(&mut self) -> Vec<LogMessage> {
        core::mem::take(&mut self.logs)
    }

    /// Destroy `addr` with its subtree, dropping the handles and document
    /// contexts that belonged to it.
    pub(crate) fn destroy_object(&mut self, addr: ObjectAddr) -> Result<(), Error> {
        let removed = self.heap.destroy(addr)?;
        tracing::trace!(%addr, count = removed.len(), "destroyed objects");
        for addr in removed {
            self.handles.remove(&addr);
            for context in self.instances.remove(&addr).into_iter().flatten() {
                self.namespaces.remove(context);
            }
        }
        Ok(())
    }

    pub(crate) fn read_property(&self, addr: ObjectAddr, name: &str) -> Result<Variant, Error> {
        self.heap
            .get(addr)?
            .slot(name)
            .map(|slot| slot.value.clone())
            .ok_or_else(|| Error::not_found(Lookup::Property, name))
    }

    /// Store `value` into property `name`, coerced to the property's kind.
    pub(crate) fn write_property(
        &mut self,
        addr: ObjectAddr,
        name: &str,
        value: Variant,
    ) -> Result<(), Error> {
        let slot = self
            .heap
            .get_mut(addr)?
            .slot_mut(name)
            .ok_or_else(|| Error::not_found(Lookup::Property, name))?;
        let kind = slot.kind;
        slot.value = kind
            .coerce(value)
            .map_err(|value| Error::mismatch(kind, value.kind()))?;
        Ok(())
    }

    /// Native methods of the object's type first, then document functions.
    pub(crate) fn method(&self, addr: ObjectAddr, name: &str) -> Result<Callable, Error> {
        let object = self.heap.get(addr)?;
        if let Some(method) = object.ty.method(name) {
            return Ok(Callable::Native(method.clone()));
        }
        object
            .functions
            .get(name)
            .map(|function| Callable::Function(function.clone()))
            .ok_or_else(|| Error::not_found(Lookup::Method, name))
    }

    /// Call `name` on `addr` on behalf of the host.
    ///
    /// Exceptions raised by document code become [`Error::Script`].
    pub(crate) fn invoke(
        &mut self,
        addr: ObjectAddr,
        name: &str,
        args: &[Variant],
    ) -> Result<Variant, Error> {
        match self.method(addr, name)? {
            Callable::Native(method) => {
                if args.len() != method.arity {
                    return Err(Error::Arity {
                        method: name.to_string(),
                        expected: method.arity,
                        found: args.len(),
                    });
                }
                (method.call)(self, addr, args)
            }
            Callable::Function(function) => {
                let line = function.decl.line;
                Evaluator::new(self)
                    .call_function(&function, addr, args, line)
                    .map_err(|exception| exception.into_error())
            }
        }
    }
}

impl Drop for State {
    fn drop(&mut self) {
        tracing::debug!(
            engine = %self.engine_id,
            objects = self.heap.len(),
            contexts = self.namespaces.len(),
            hosts = self.hosts.len(),
            documents = self.documents.len(),
            "engine state torn down"
        );
    }
}
