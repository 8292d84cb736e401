//! Error rendering using ariadne
//!
//! Compile errors carry the document text and the byte span of the offending
//! construct, so they are shown as an annotated source snippet. Every other
//! error is a single line.

use crate::{CompileError, Error};
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error to stderr
///
/// # Example
/// ```no_run
/// use scena::{Component, Engine, EngineOptions, render_error};
///
/// let engine = Engine::new(EngineOptions::default()).unwrap();
/// let mut component = Component::new(&engine);
/// if let Err(e) = component.set_source("main.qml", "Item {}") {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compile(err) => render_compile_error(err, writer, use_color),
        other => writeln!(writer, "Error: {}", other),
    }
}

fn render_compile_error(
    error: &CompileError,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let id = error.identifier();
    let span = error.span();
    let config = Config::default()
        .with_color(use_color)
        .with_index_type(IndexType::Byte);

    Report::build(ReportKind::Error, (id, span.clone()))
        .with_message(format!("{}:{} {}", id, error.line(), error.message()))
        .with_config(config)
        .with_label(
            Label::new((id, span))
                .with_message(error.message())
                .with_color(Color::Red),
        )
        .finish()
        .write((id, Source::from(error.source_text())), &mut *writer)
}
