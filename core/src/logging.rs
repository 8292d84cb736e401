//! Log output of documents.
//!
//! `console.log` and friends, as well as warnings raised while a document is
//! instantiated, produce [`LogMessage`]s. The engine hands them to its
//! [`Logger`] once the job that produced them has released the engine state,
//! so a logger is free to call back into the engine.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        })
    }
}

/// A single line of document output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: LogLevel,
    /// Identifier of the document that produced the message.
    pub identifier: String,
    pub line: usize,
    pub text: String,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.identifier, self.line, self.text)
    }
}

/// Receiver of document log output.
pub trait Logger: Send + Sync {
    fn log(&self, message: &LogMessage);
}

impl<F> Logger for F
where
    F: Fn(&LogMessage) + Send + Sync,
{
    fn log(&self, message: &LogMessage) {
        self(message)
    }
}

/// Forwards messages to `tracing` under the `scena::console` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &LogMessage) {
        match message.level {
            LogLevel::Debug => tracing::debug!(target: "scena::console", "{}", message),
            LogLevel::Info => tracing::info!(target: "scena::console", "{}", message),
            LogLevel::Warning => tracing::warn!(target: "scena::console", "{}", message),
            LogLevel::Error => tracing::error!(target: "scena::console", "{}", message),
        }
    }
}
