//! The engine side of the bridge: the engine thread, its state and the
//! native object model.

pub(crate) mod dispatcher;
pub mod heap;
pub(crate) mod instantiate;
pub(crate) mod modules;
pub(crate) mod namespace;
pub(crate) mod state;
pub(crate) mod types;

#[cfg(test)]
mod dispatcher_test;
