//! Token definitions for the Oxi lexer

use crate::common::{Position, Span};
use logos::Logos;
use serde::{Deserialize, Serialize};

/// A token with its kind, span, text and position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Token kinds recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Serialize, Deserialize)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    #[regex(r"//[^\n]*")]
    #[token("/*", block_comment)]
    Comment,

    // Keywords
    #[token("if")]
    If,
    #[token("elseif")]
    ElseIf,
    #[token("else")]
    Else,
    #[token("endif")]
    EndIf,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("endfor")]
    EndFor,
    #[token("return")]
    Return,
    #[token("try")]
    Try,
    #[token("except")]
    Except,
    #[token("endtry")]
    EndTry,
    #[token("any")]
    Any,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals. A number span is reclassified as `Float` by `lex` when
    // its text is not a plain integer.
    #[regex(r"[0-9]+", number_fraction)]
    Integer,
    Float,
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // Compound operators
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("..")]
    DotDot,
    #[token("=>")]
    FatArrow,

    // Single-character operators
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBrack,
    #[token("]")]
    RightBrack,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Equal,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("!")]
    Bang,
    #[token("#")]
    Hash,
    #[token("$")]
    Dollar,
    #[token("^")]
    Caret,
    #[token("`")]
    Backtick,
    #[token("'")]
    Quote,

    // Special
    Eof,
}

/// Consumes a C-style comment body after its opening `/*`.
///
/// An unterminated comment is reported as a lexical failure.
fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

/// Extends a digit run over a `.digits` fraction.
///
/// A dot not followed by a digit is left alone so `1..3` still lexes as
/// `Integer DotDot Integer`.
fn number_fraction(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    if let Some(fraction) = rest.strip_prefix('.') {
        let digits = fraction.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 {
            lex.bump(1 + digits);
        }
    }
    true
}

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::ElseIf
                | TokenKind::Else
                | TokenKind::EndIf
                | TokenKind::For
                | TokenKind::In
                | TokenKind::EndFor
                | TokenKind::Return
                | TokenKind::Try
                | TokenKind::Except
                | TokenKind::EndTry
                | TokenKind::Any
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Get the string representation of the token
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Comment => "<comment>",
            TokenKind::If => "if",
            TokenKind::ElseIf => "elseif",
            TokenKind::Else => "else",
            TokenKind::EndIf => "endif",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::EndFor => "endfor",
            TokenKind::Return => "return",
            TokenKind::Try => "try",
            TokenKind::Except => "except",
            TokenKind::EndTry => "endtry",
            TokenKind::Any => "any",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Integer => "<integer>",
            TokenKind::Float => "<float>",
            TokenKind::String => "<string>",
            TokenKind::Identifier => "<identifier>",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::DotDot => "..",
            TokenKind::FatArrow => "=>",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBrack => "[",
            TokenKind::RightBrack => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Equal => "=",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Bang => "!",
            TokenKind::Hash => "#",
            TokenKind::Dollar => "$",
            TokenKind::Caret => "^",
            TokenKind::Backtick => "`",
            TokenKind::Quote => "'",
            TokenKind::Eof => "<eof>",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
