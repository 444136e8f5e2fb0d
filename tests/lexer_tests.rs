//! Lexer tests

use oxi::lexer::{LexError, TokenKind, lex};
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_lex_empty() {
    assert!(lex("").unwrap().is_empty());
    assert!(lex("   \t\n  ").unwrap().is_empty());
}

#[test]
fn test_lex_punctuation() {
    let tokens = lex("=+(){},;").unwrap();
    let expected = [
        (TokenKind::Equal, "="),
        (TokenKind::Plus, "+"),
        (TokenKind::LeftParen, "("),
        (TokenKind::RightParen, ")"),
        (TokenKind::LeftBrace, "{"),
        (TokenKind::RightBrace, "}"),
        (TokenKind::Comma, ","),
        (TokenKind::Semicolon, ";"),
    ];
    assert_eq!(tokens.len(), expected.len());
    for (token, (kind, text)) in tokens.iter().zip(expected) {
        assert_eq!(token.kind, kind);
        assert_eq!(token.text, text);
    }
}

#[test]
fn test_lex_multi_char_operators() {
    assert_eq!(
        kinds("== != <= >= && || .. =>"),
        vec![
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::DotDot,
            TokenKind::FatArrow,
        ]
    );
}

#[test]
fn test_lex_keywords() {
    let source = "if elseif else endif for in endfor return try except endtry any true false";
    let tokens = lex(source).unwrap();
    assert_eq!(tokens.len(), 14);
    assert!(tokens.iter().all(|t| t.kind.is_keyword()));
    assert_eq!(tokens[3].kind, TokenKind::EndIf);
    assert_eq!(tokens[11].kind, TokenKind::Any);
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let tokens = lex("iffy endfortune _x1").unwrap();
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Identifier));
    assert_eq!(tokens[1].text, "endfortune");
}

// ==================== Numbers ====================

#[test]
fn test_lex_integer_and_float() {
    let tokens = lex("123 1.5").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].text, "123");
    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(tokens[1].text, "1.5");
}

#[test]
fn test_oversized_integer_becomes_float() {
    let tokens = lex("99999999999999999999").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Float);
}

#[test]
fn test_lex_range_is_not_a_float() {
    assert_eq!(
        kinds("[1..3]"),
        vec![
            TokenKind::LeftBrack,
            TokenKind::Integer,
            TokenKind::DotDot,
            TokenKind::Integer,
            TokenKind::RightBrack,
        ]
    );
}

#[test]
fn test_lex_trailing_dot() {
    assert_eq!(kinds("1."), vec![TokenKind::Integer, TokenKind::Dot]);
}

// ==================== Strings and comments ====================

#[test]
fn test_lex_string_with_escapes() {
    let tokens = lex(r#""say \"hi\"""#).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].text, r#""say \"hi\"""#);
}

#[test]
fn test_lex_comments() {
    let tokens = lex("// line\nx /* block\n comment */ y").unwrap();
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Comment,
            TokenKind::Identifier,
            TokenKind::Comment,
            TokenKind::Identifier,
        ]
    );
    assert_eq!(tokens[0].text, "// line");
    assert_eq!(tokens[2].text, "/* block\n comment */");
}

#[test]
fn test_lex_object_and_system_references() {
    assert_eq!(
        kinds("#12 $thing `'"),
        vec![
            TokenKind::Hash,
            TokenKind::Integer,
            TokenKind::Dollar,
            TokenKind::Identifier,
            TokenKind::Backtick,
            TokenKind::Quote,
        ]
    );
}

// ==================== Positions and errors ====================

#[test]
fn test_token_positions() {
    let tokens = lex("x = 1;\n  y").unwrap();
    let y = tokens.last().unwrap();
    assert_eq!((y.line, y.column), (2, 3));
    assert_eq!(y.span.start, 9);
}

#[test]
fn test_unterminated_string_is_error() {
    let err = lex("x = \"abc").unwrap_err();
    let LexError::UnexpectedCharacter { found, position, .. } = err;
    assert_eq!(found, "\"");
    assert_eq!((position.line, position.column), (1, 5));
}

#[test]
fn test_unterminated_block_comment_is_error() {
    let err = lex("1 /* never closed").unwrap_err();
    assert_eq!(err.position().column, 3);
}

#[test]
fn test_unknown_character_is_error() {
    let err = lex("a @ b").unwrap_err();
    assert_eq!(err.position().column, 3);
}
