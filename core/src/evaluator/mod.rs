//! Tree-walking evaluator for document expressions and function bodies.
//!
//! ## Name Resolution
//!
//! An identifier is looked up, in order, in:
//!
//! - the locals of the running function (parameters and `var`s),
//! - the ids declared by the document,
//! - `parent`, the parent of the receiver,
//! - the properties of the receiver, then of the document root,
//! - the bindings of the context the document was created in and its ancestors.
//!
//! `console` and `Math` are available unless a name above shadows them.
//!
//! Numbers are always `float64`; properties coerce on assignment.

mod error;
mod eval;
mod operators;


use std::sync::Arc;

pub(crate) use error::Exception;
pub(crate) use eval::{Args, Evaluator};

use crate::runtime::heap::ObjectAddr;
use crate::runtime::namespace::ContextId;

/// Where code declared in a document instance runs.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    /// The context holding the document's ids; its parent is the creation context.
    pub context: ContextId,
    /// Root object of the document instance.
    pub root: ObjectAddr,
    /// Identifier of the document, for log lines and errors.
    pub identifier: Arc<str>,
}
