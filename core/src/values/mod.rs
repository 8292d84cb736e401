//! Values crossing the host/engine boundary.
//!
//! Two representations exist:
//!
//! - [`Value`] is the host-side view. It can hold [`Object`](crate::Object)
//!   handles and [`HostRef`]s and is `Send`, so it travels freely between
//!   threads.
//! - [`Variant`] is the engine-side view stored in native objects and
//!   contexts. Object and host references are plain addresses into the
//!   engine's registries.
//!
//! [`ToValue`] and [`FromValue`] convert between Rust types and [`Value`] on
//! the calling thread. The [`codec`] functions convert between [`Value`] and
//! [`Variant`] and must run on the engine thread because they consult the
//! handle and host registries.

pub(crate) mod codec;
mod convert;
mod host;
mod kind;
mod value;
pub(crate) mod variant;

pub use convert::{FromValue, ToValue};
pub use host::{HostObject, HostRef};
pub use kind::Kind;
pub(crate) use kind::PropertyKind;
pub use value::Value;
pub(crate) use variant::{HostId, Variant};
