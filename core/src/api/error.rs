//! Public error type for the Scena API.
//!
//! Every fallible operation returns [`Error`]. Compilation problems carry a
//! full [`CompileError`] with a source span so callers can render them; the
//! remaining variants describe lookups, conversions and lifecycle failures.

use core::fmt;
use std::io;

use thiserror::Error;

use crate::compiler::CompileError;
use crate::runtime::heap::ObjectAddr;

/// What kind of name a failed lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// A context binding.
    Binding,
    Property,
    Method,
    /// A descendant looked up by `objectName`.
    Object,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lookup::Binding => "binding",
            Lookup::Property => "property",
            Lookup::Method => "method",
            Lookup::Object => "object",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: Lookup, name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("engine already closed")]
    Closed,

    #[error("object {0} was destroyed")]
    Destroyed(ObjectAddr),

    #[error("object belongs to a different engine")]
    ForeignObject,

    /// An exception raised while running document code on behalf of the host.
    #[error("{identifier}:{line}: {message}")]
    Script {
        identifier: String,
        line: usize,
        message: String,
    },

    #[error("{method}() expects {expected} argument(s), got {found}")]
    Arity {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot start engine thread: {0}")]
    Spawn(#[source] io::Error),
}

impl Error {
    pub(crate) fn not_found(kind: Lookup, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
