//! Core of the Scena scene engine bridge.
//!
//! This crate embeds a declarative scene engine into a Rust program. The host
//! opens an [`Engine`], binds values into its root [`Context`], compiles
//! documents into [`Component`]s and instantiates them into trees of native
//! objects that are manipulated through [`Object`] handles.
//!
//! All native state lives on a dedicated engine thread. Every public handle
//! is `Send + Sync`; calls made from other threads are marshaled onto the
//! engine thread and block until they complete, unless an `_async` variant is
//! used.

extern crate self as scena_core;

pub mod api;
pub(crate) mod compiler;
pub(crate) mod evaluator;
pub mod logging;
pub(crate) mod parser;
pub mod record;
pub(crate) mod runtime;
pub mod values;

pub use api::{
    Component, Context, Engine, EngineId, EngineOptions, Error, Lookup, Object, Result, Status,
    Window,
};
pub use compiler::CompileError;
pub use logging::{LogLevel, LogMessage, Logger, TracingLogger};
pub use record::{ExposeError, FieldDescriptor, Record, RecordDescriptor};
pub use runtime::heap::ObjectAddr;
pub use scena_macros::Record;
pub use values::{FromValue, HostObject, HostRef, Kind, ToValue, Value};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
}
