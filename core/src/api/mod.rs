//! Public API of the Scena engine bridge.
//!
//! # Example
//!
//! ```
//! use scena_core::api::{Component, Engine, EngineOptions};
//!
//! let engine = Engine::new(EngineOptions::default()).unwrap();
//! engine.root_context().set("greeting", "hello").unwrap();
//!
//! let mut component = Component::new(&engine);
//! component
//!     .set_source(
//!         "hello.qml",
//!         "import QtQuick 2.0\nText { text: greeting + \", world\" }",
//!     )
//!     .unwrap();
//!
//! let text = component.create(&engine.root_context()).unwrap();
//! assert_eq!(text.property_as::<String>("text").unwrap(), "hello, world");
//! ```

pub mod component;
pub mod context;
pub mod engine;
pub mod error;
pub mod object;
pub mod options;
pub mod window;

pub use component::{Component, Status};
pub use context::Context;
pub use engine::{Engine, EngineId};
pub use error::{Error, Lookup, Result};
pub use object::Object;
pub use options::EngineOptions;
pub use window::Window;

static_assertions::assert_impl_all!(Engine: Send, Sync, Clone);
static_assertions::assert_impl_all!(Context: Send, Sync, Clone);
static_assertions::assert_impl_all!(Object: Send, Sync, Clone);
static_assertions::assert_impl_all!(Component: Send, Sync);
static_assertions::assert_impl_all!(Window: Send, Sync);
static_assertions::assert_impl_all!(Error: Send, Sync);
static_assertions::assert_impl_all!(crate::values::Value: Send, Sync);
