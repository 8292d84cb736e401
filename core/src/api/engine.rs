//! The Scena engine and its thread.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Context, EngineOptions, Error, Result};
use crate::logging::{LogMessage, Logger, TracingLogger};
use crate::runtime::dispatcher::Dispatcher;
use crate::runtime::namespace::ContextId;
use crate::runtime::state::{self, State};

/// Process-unique identifier of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

impl EngineId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        EngineId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

pub(crate) struct EngineShared {
    id: EngineId,
    dispatcher: Dispatcher,
    closed: AtomicBool,
    logger: RwLock<Arc<dyn Logger>>,
    options: EngineOptions,
}

impl EngineShared {
    fn deliver(&self, logs: &[LogMessage]) {
        if logs.is_empty() {
            return;
        }
        // Released before logging so the logger may replace itself.
        let logger = self.logger.read().clone();
        for message in logs {
            logger.log(message);
        }
    }
}

impl Drop for EngineShared {
    fn drop(&mut self) {
        self.dispatcher.shutdown();
    }
}

/// A running scene engine.
///
/// The engine owns a dedicated thread on which every native object, context
/// and compiled document lives. `Engine` is a cheap, clonable handle to it;
/// the engine shuts down when [`close`](Engine::close) is called or when the
/// last `Engine`, [`Context`] or [`Component`](super::Component) is dropped.
/// [`Object`](super::Object) handles do not keep it running.
///
/// # Example
///
/// ```
/// use scena_core::{Component, Engine, EngineOptions, Value};
///
/// let engine = Engine::new(EngineOptions::default()).unwrap();
/// let context = engine.root_context();
/// context.set("n", 21isize).unwrap();
///
/// let mut component = Component::new(&engine);
/// component
///     .set_source("main.qml", "import QtQuick 2.0\nItem { width: n * 2 }")
///     .unwrap();
/// let root = component.create(&context).unwrap();
/// assert_eq!(root.property("width").unwrap(), Value::Float64(42.0));
///
/// engine.close();
/// ```
#[derive(Clone)]
pub struct Engine {
    pub(crate) shared: Arc<EngineShared>,
}

impl Engine {
    /// Start a new engine thread.
    pub fn new(options: EngineOptions) -> Result<Self> {
        let id = EngineId::next();
        let dispatcher = Dispatcher::spawn(&options.thread_name, || drop(state::uninstall()))?;
        let shared = Arc::new(EngineShared {
            id,
            dispatcher,
            closed: AtomicBool::new(false),
            logger: RwLock::new(Arc::new(TracingLogger)),
            options: options.clone(),
        });

        let engine = Arc::downgrade(&shared);
        shared
            .dispatcher
            .run_sync(move || state::install(State::new(engine, id, options)))?;

        tracing::debug!(engine = %id, "engine started");
        Ok(Engine { shared })
    }

    pub(crate) fn from_shared(shared: Arc<EngineShared>) -> Self {
        Engine { shared }
    }

    pub fn id(&self) -> EngineId {
        self.shared.id
    }

    pub fn options(&self) -> &EngineOptions {
        &self.shared.options
    }

    /// The context every document scope ultimately falls back to.
    ///
    /// # Panics
    ///
    /// Panics if the engine is closed.
    pub fn root_context(&self) -> Context {
        if self.is_closed() {
            panic!("engine already closed");
        }
        Context::new(ContextId::ROOT, self.clone())
    }

    /// Shut the engine down.
    ///
    /// Calls already accepted by the engine thread complete; everything else
    /// fails with [`Error::Closed`]. All native objects are destroyed.
    /// Closing twice is a no-op.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(engine = %self.shared.id, "closing engine");
        self.shared.dispatcher.shutdown();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Route document log output to `logger`. The default is [`TracingLogger`].
    pub fn set_logger(&self, logger: impl Logger + 'static) {
        *self.shared.logger.write() = Arc::new(logger);
    }

    /// Run `f` on the engine thread and wait for its result.
    ///
    /// When called from the engine thread `f` runs immediately. A panic in
    /// `f` propagates to the caller.
    pub fn run_on_engine_thread<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.check_open()?;
        self.shared.dispatcher.run_sync(f)
    }

    /// Queue `f` on the engine thread and return immediately.
    pub fn run_on_engine_thread_async<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.check_open()?;
        self.shared.dispatcher.run_async(f)
    }

    pub fn is_engine_thread(&self) -> bool {
        self.shared.dispatcher.is_current()
    }

    /// Number of native objects alive in the engine.
    pub fn object_count(&self) -> Result<usize> {
        self.with_state(|state| Ok(state.heap.len()))
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Run `f` against the engine state and wait for it.
    ///
    /// Log messages produced by `f` are delivered after the state is released.
    pub(crate) fn with_state<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut State) -> Result<R> + Send + 'static,
    {
        self.check_open()?;
        let (result, logs) = self.shared.dispatcher.run_sync(move || {
            let mut logs = Vec::new();
            let result = state::with(|state| {
                let result = f(state);
                logs = state.take_logs();
                result
            });
            (result, logs)
        })?;
        self.shared.deliver(&logs);
        result
    }

    /// Queue `f` against the engine state. Errors are logged, not returned.
    pub(crate) fn with_state_async<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut State) -> Result<()> + Send + 'static,
    {
        self.check_open()?;
        let engine = Arc::downgrade(&self.shared);
        self.shared.dispatcher.run_async(move || {
            let mut logs = Vec::new();
            let result = state::with(|state| {
                let result = f(state);
                logs = state.take_logs();
                result
            });
            if let Err(err) = result {
                tracing::warn!(error = %err, "async engine call failed");
            }
            if let Some(engine) = engine.upgrade() {
                engine.deliver(&logs);
            }
        })
    }
}

impl PartialEq for Engine {
    fn eq(&self, other: &Self) -> bool {
        self.shared.id == other.shared.id
    }
}

impl Eq for Engine {}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.shared.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
