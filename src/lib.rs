//! Scena - embed a declarative scene engine in a Rust program
//!
//! # Overview
//!
//! Scena runs a small declarative document language on a dedicated engine
//! thread. The host binds values into contexts, compiles documents into
//! components and instantiates them into trees of native objects that can be
//! read, modified and called from any thread.
//!
//! # Quick Start
//!
//! ```
//! use scena::{Component, Engine, EngineOptions, Value};
//!
//! let engine = Engine::new(EngineOptions::default()).unwrap();
//! let context = engine.root_context();
//! context.set("N", 42isize).unwrap();
//!
//! let mut component = Component::new(&engine);
//! component
//!     .set_source("main.qml", "import QtQuick 2.0\nItem { width: N * 2 }")
//!     .unwrap();
//!
//! let root = component.create(&context).unwrap();
//! assert_eq!(root.property("width").unwrap(), Value::Float64(84.0));
//! engine.close();
//! ```
//!
//! # Host records
//!
//! Structs deriving [`Record`] can be exposed field by field into a context,
//! or bound as a whole through an `Arc` so documents read their fields live:
//!
//! ```
//! use std::sync::Arc;
//! use scena::{Engine, EngineOptions, Record};
//!
//! #[derive(Record)]
//! struct Config {
//!     title: String,
//!     #[record(rename = "limit")]
//!     max_items: i32,
//! }
//!
//! let engine = Engine::new(EngineOptions::default()).unwrap();
//! let config = Config { title: "demo".into(), max_items: 3 };
//! engine.root_context().expose(&config).unwrap();
//! engine.root_context().set("config", Arc::new(config)).unwrap();
//! assert_eq!(engine.root_context().get_as::<i32>("limit").unwrap(), 3);
//! ```

// Re-export public API from scena_core
pub use scena_core::api::{
    Component, Context, Engine, EngineId, EngineOptions, Error, Lookup, Object, Result, Status,
    Window,
};

pub use scena_core::logging::{self, LogLevel, LogMessage, Logger, TracingLogger};
pub use scena_core::record::{ExposeError, FieldDescriptor, RecordDescriptor};
pub use scena_core::values::{self, FromValue, HostObject, HostRef, Kind, ToValue, Value};
pub use scena_core::{CompileError, ObjectAddr, Record};

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
