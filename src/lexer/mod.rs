//! Lexer for the Oxi language
//!
//! A single left-to-right scan over the source. Token tables are generated
//! at compile time by logos; this module turns its output into positioned
//! [`Token`]s and classifies number spans.

mod tokens;

pub use tokens::{Token, TokenKind};

use crate::common::{LineIndex, Position, Span};
use logos::Logos;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Lexical failure at the first character no token rule matches
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected character {found:?} at {position}")]
    #[diagnostic(code(lex::unexpected_character))]
    UnexpectedCharacter {
        found: String,
        position: Position,
        #[label("no token starts here")]
        span: SourceSpan,
    },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. } => *position,
        }
    }
}

/// Tokenize source text.
///
/// Whitespace is dropped; comments are kept as [`TokenKind::Comment`] tokens.
/// No end-of-input marker is appended.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let index = LineIndex::new(source);
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        let position = index.position(span.start);

        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                let found = source[span.start..]
                    .chars()
                    .next()
                    .map(String::from)
                    .unwrap_or_default();
                return Err(LexError::UnexpectedCharacter {
                    span: SourceSpan::new(span.start.into(), found.len()),
                    found,
                    position,
                });
            }
        };

        let text = lexer.slice();
        let kind = match kind {
            TokenKind::Integer if text.parse::<i64>().is_err() => TokenKind::Float,
            other => other,
        };

        tokens.push(Token {
            kind,
            span,
            text: text.to_string(),
            line: position.line,
            column: position.column,
        });
    }

    tracing::debug!("Lexed {} tokens", tokens.len());
    Ok(tokens)
}
