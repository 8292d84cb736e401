//! Document compilation errors.

use core::fmt;
use core::ops::Range;
use std::sync::Arc;

use pest::error::{Error as PestError, InputLocation, LineColLocation};

use crate::parser::Rule;

/// The first diagnostic of a failed compilation.
///
/// Displays as `"<identifier>:<line> <message>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    identifier: String,
    line: usize,
    column: usize,
    message: String,
    span: Range<usize>,
    source_text: Arc<str>,
}

impl CompileError {
    /// Build an error located at byte range `span` of `source_text`.
    pub(crate) fn at(
        identifier: &str,
        source_text: &Arc<str>,
        span: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        let (line, column) = line_col(source_text, span.start);
        CompileError {
            identifier: identifier.to_string(),
            line,
            column,
            message: message.into(),
            span,
            source_text: source_text.clone(),
        }
    }

    pub(crate) fn from_pest(identifier: &str, source_text: &Arc<str>, err: PestError<Rule>) -> Self {
        let err = err.renamed_rules(describe_rule);
        let span = match err.location {
            InputLocation::Pos(pos) => pos..pos,
            InputLocation::Span((start, end)) => start..end,
        };
        let (line, column) = match err.line_col {
            LineColLocation::Pos(pos) => pos,
            LineColLocation::Span(start, _) => start,
        };
        CompileError {
            identifier: identifier.to_string(),
            line,
            column,
            message: format!("Syntax error: {}", err.variant.message()),
            span,
            source_text: source_text.clone(),
        }
    }

    /// Wrap a failure of a nested file type compiled for `type_name`.
    pub(crate) fn unavailable(self, type_name: &str, at: CompileError) -> Self {
        CompileError {
            message: format!("Type {} unavailable: {}", type_name, self),
            ..at
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// One-based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// One-based column number.
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte range of the offending text in [`CompileError::source_text`].
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.identifier, self.line, self.message)
    }
}

impl std::error::Error for CompileError {}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input",
        Rule::object => "object declaration",
        Rule::type_ref | Rule::type_name => "type name",
        Rule::ident => "identifier",
        Rule::expression => "expression",
        Rule::block => "block",
        Rule::import_decl => "import",
        Rule::property_decl => "property declaration",
        Rule::function_decl => "function declaration",
        Rule::binding => "property binding",
        Rule::attached => "attached handler",
        Rule::string => "string",
        Rule::number => "number",
        Rule::module_name => "module name",
        Rule::version => "version",
        Rule::qualifier => "qualifier",
        Rule::params => "parameter list",
        Rule::call_op => "argument list",
        Rule::member_access => "member access",
        Rule::assign_op => "assignment",
        _ => return format!("{:?}", rule),
    }
    .to_string()
}
