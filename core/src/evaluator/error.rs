//! Script exceptions.
//!
//! Exceptions are raised by document code and never cross into the host as
//! panics: during instantiation they become warnings, during host-initiated
//! calls they become [`Error::Script`].

use core::fmt;
use std::sync::Arc;

use crate::api::{Error, Lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExceptionKind {
    ReferenceError,
    TypeError,
    RangeError,
    /// A host-level failure surfaced to the script (e.g. a destroyed object).
    Error,
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExceptionKind::ReferenceError => "ReferenceError",
            ExceptionKind::TypeError => "TypeError",
            ExceptionKind::RangeError => "RangeError",
            ExceptionKind::Error => "Error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Exception {
    pub kind: ExceptionKind,
    pub message: String,
    pub identifier: Arc<str>,
    pub line: usize,
}

impl Exception {
    /// `"<kind>: <message>"`, the text of the log line.
    pub(crate) fn text(&self) -> String {
        format!("{}: {}", self.kind, self.message)
    }

    /// Convert an engine error raised while running script code.
    pub(crate) fn from_error(err: Error, identifier: &Arc<str>, line: usize) -> Self {
        let (kind, message) = match err {
            Error::NotFound {
                kind: Lookup::Method,
                name,
            } => (ExceptionKind::TypeError, format!("{} is not a function", name)),
            Error::NotFound { kind, name } => (
                ExceptionKind::TypeError,
                format!("Cannot access {} \"{}\"", kind, name),
            ),
            Error::TypeMismatch { expected, found } => (
                ExceptionKind::TypeError,
                format!("Cannot assign {} to {}", found, expected),
            ),
            Error::Arity { .. } => (ExceptionKind::TypeError, err.to_string()),
            // Already a script failure from a nested call; keep its text.
            Error::Script { message, .. } => (ExceptionKind::Error, message),
            other => (ExceptionKind::Error, other.to_string()),
        };
        Exception {
            kind,
            message,
            identifier: identifier.clone(),
            line,
        }
    }

    pub(crate) fn into_error(self) -> Error {
        let message = self.text();
        Error::Script {
            identifier: self.identifier.to_string(),
            line: self.line,
            message,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.identifier, self.line, self.text())
    }
}
