//! Diagnostic reporting with source locations
//!
//! Lexer, parser and interpreter failures carry only spans and positions.
//! This module pairs them with the source text so miette can render them.

use crate::common::{Position, Span};
use crate::interp::Fault;
use crate::lexer::LexError;
use crate::parser::ParseError;
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }

    /// Attach this source to a diagnostic for rendering
    pub fn report<E>(&self, error: E) -> Report
    where
        E: Diagnostic + Send + Sync + 'static,
    {
        Report::new(error).with_source_code(self.to_named_source())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Any failure of the lex → parse → run pipeline
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum OxiError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] Fault),
}

impl OxiError {
    pub fn position(&self) -> Position {
        match self {
            OxiError::Lex(e) => e.position(),
            OxiError::Parse(e) => e.position(),
            OxiError::Runtime(e) => e.position(),
        }
    }
}
