use calchart_ast::Span;
use thiserror::Error;

/// The parser never recovers mid-text: one unrecognised construct abandons
/// the whole continuity program for that marcher (spec'd at the component
/// boundary as `SYNTAX_ERROR(span)`; `calchart-compiler` is the layer that
/// turns this into a registered `ErrorKind::Syntax` and an empty chain).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("syntax error at line {line}, column {column}: {message}", line = span.line, column = span.column)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        ParseError { span, message: message.into() }
    }
}
