//! Document compiler.
//!
//! Turns document source into a [`Factory`]: imports are resolved, object
//! types are looked up in the native catalogue or loaded from `<Type>.qml`
//! files, and every binding is checked against the property table of its
//! object. Expressions are kept as syntax trees and evaluated at
//! instantiation time.

mod compile;
mod error;
pub(crate) mod factory;

pub(crate) use compile::{DocumentCache, compile};
pub use error::CompileError;
pub(crate) use factory::{CompiledObject, CompiledValue, Factory, ObjectType};
