//! Parser for the Oxi language
//!
//! Each grammar rule is one method; binary precedence levels are built from
//! a single left-chaining combinator so a level can be added or reordered
//! without touching its neighbours. There is no error recovery: the first
//! unmet expectation is reported with its position.

use crate::ast::*;
use crate::common::{Position, Span};
use crate::lexer::{Token, TokenKind};
use crate::value::{ObjectId, Value};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Grammar expectation unmet at the current token
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected {expected}, found {found} at {position}")]
    #[diagnostic(code(parse::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
        #[label("unexpected token here")]
        span: SourceSpan,
    },

    #[error("Expected {expected}, found end of input at {position}")]
    #[diagnostic(code(parse::unexpected_eof))]
    UnexpectedEof {
        expected: String,
        position: Position,
        #[label("expected more tokens")]
        span: SourceSpan,
    },

    #[error("Left side of '=' must be an identifier at {position}")]
    #[diagnostic(code(parse::invalid_assignment))]
    InvalidAssignment {
        position: Position,
        #[label("cannot assign to this")]
        span: SourceSpan,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::InvalidAssignment { position, .. } => *position,
        }
    }
}

type Result<T> = std::result::Result<T, ParseError>;

/// Parse a whole program into one `Stmt::Block`
pub fn parse_program(tokens: &[Token]) -> Result<Stmt> {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_block()?;
    parser.expect_end("statement")?;
    if let Stmt::Block { statements } = &program {
        tracing::debug!("Parsed {} statements", statements.len());
    }
    Ok(program)
}

/// Parse a single expression covering the whole token sequence
pub fn parse_expression(tokens: &[Token]) -> Result<Expr> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    parser.expect_end("end of expression")?;
    Ok(expr)
}

/// Tokens that close a block
const BLOCK_END: &[TokenKind] = &[
    TokenKind::Eof,
    TokenKind::ElseIf,
    TokenKind::Else,
    TokenKind::EndIf,
    TokenKind::EndFor,
    TokenKind::Except,
    TokenKind::EndTry,
];

const DISJUNCTION: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::PipePipe, BinaryOp::Or),
    (TokenKind::Caret, BinaryOp::Xor),
];

const CONJUNCTION: &[(TokenKind, BinaryOp)] = &[(TokenKind::AmpAmp, BinaryOp::And)];

const COMPARISON: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::Less, BinaryOp::Lt),
    (TokenKind::LessEqual, BinaryOp::Le),
    (TokenKind::Greater, BinaryOp::Gt),
    (TokenKind::GreaterEqual, BinaryOp::Ge),
    (TokenKind::EqualEqual, BinaryOp::Eq),
    (TokenKind::BangEqual, BinaryOp::Ne),
];

const ADDITIVE: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::Plus, BinaryOp::Add),
    (TokenKind::Minus, BinaryOp::Sub),
];

const MULTIPLICATIVE: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::Star, BinaryOp::Mul),
    (TokenKind::Slash, BinaryOp::Div),
    (TokenKind::Percent, BinaryOp::Rem),
];

/// A grammar rule producing an expression
type Rule = fn(&mut Parser) -> Result<Expr>;

/// Parser state
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Drops comments and appends a synthetic end-of-input token
    fn new(tokens: &[Token]) -> Self {
        let mut tokens: Vec<Token> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .cloned()
            .collect();
        let eof = end_of_input(tokens.last());
        tokens.push(eof);
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        // `new` guarantees a trailing Eof, and `advance` never moves past it.
        &self.tokens[self.pos]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(&describe(kind)))
        }
    }

    fn expect_end(&self, expected: &str) -> Result<()> {
        if self.at(TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    /// Error naming the current token and what was expected instead
    fn error(&self, expected: &str) -> ParseError {
        let token = self.current();
        let span = SourceSpan::from(token.span);
        if token.kind == TokenKind::Eof {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                position: token.position(),
                span,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("'{}'", token.text),
                position: token.position(),
                span,
            }
        }
    }

    fn parse_ident(&mut self) -> Result<(String, Token)> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok((token.text.clone(), token))
    }

    // ==================== STATEMENTS ====================

    fn parse_block(&mut self) -> Result<Stmt> {
        let start = self.current().clone();
        let mut statements = Vec::new();

        loop {
            while self.eat(TokenKind::Semicolon) {}
            if self.at_any(BLOCK_END) {
                break;
            }
            statements.push(self.parse_stmt()?);
        }

        // An empty block still evaluates to something
        if statements.is_empty() {
            statements.push(Stmt::ExprStmt {
                expr: Expr::Literal {
                    value: Value::Integer(0),
                    token: start,
                },
            });
        }

        Ok(Stmt::Block { statements })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Try => self.parse_try(),
            _ => {
                let expr = self.parse_expr()?;
                self.eat(TokenKind::Semicolon);
                Ok(Stmt::ExprStmt { expr })
            }
        }
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        let token = self.expect(TokenKind::Return)?;
        let expr = if self.at(TokenKind::Semicolon) || self.at_any(BLOCK_END) {
            Expr::Literal {
                value: Value::Integer(0),
                token: token.clone(),
            }
        } else {
            self.parse_expr()?
        };
        self.eat(TokenKind::Semicolon);
        Ok(Stmt::Return { expr, token })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let token = self.expect(TokenKind::If)?;
        let mut conditions = vec![self.parse_condition()?];
        let mut consequences = vec![self.parse_block()?];

        while self.eat(TokenKind::ElseIf) {
            conditions.push(self.parse_condition()?);
            consequences.push(self.parse_block()?);
        }

        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };

        self.expect(TokenKind::EndIf)?;

        Ok(Stmt::If {
            conditions,
            consequences,
            else_branch,
            token,
        })
    }

    /// `( expr )`
    fn parse_condition(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LeftParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::RightParen)?;
        Ok(expr)
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let token = self.expect(TokenKind::For)?;
        let (loop_var, _) = self.parse_ident()?;
        self.expect(TokenKind::In)?;

        let iterable = match self.peek() {
            TokenKind::LeftBrack => self.parse_range()?,
            TokenKind::LeftParen => self.parse_condition()?,
            _ => return Err(self.error("range literal or parenthesized expression")),
        };

        let body = self.parse_block()?;
        self.expect(TokenKind::EndFor)?;

        Ok(Stmt::For {
            loop_var,
            iterable,
            body: Box::new(body),
            token,
        })
    }

    fn parse_try(&mut self) -> Result<Stmt> {
        let token = self.expect(TokenKind::Try)?;
        let body = self.parse_block()?;

        let mut handler_arms = Vec::new();
        while self.at(TokenKind::Except) {
            let arm_token = self.advance();
            let binding = if self.at(TokenKind::Identifier) {
                Some(self.advance().text)
            } else {
                None
            };
            self.expect(TokenKind::LeftParen)?;
            let errors = self.parse_error_codes()?;
            self.expect(TokenKind::RightParen)?;
            let arm_body = self.parse_block()?;
            handler_arms.push(HandlerArm {
                binding,
                errors,
                body: arm_body,
                token: arm_token,
            });
        }

        if handler_arms.is_empty() {
            return Err(self.error(&describe(TokenKind::Except)));
        }
        self.expect(TokenKind::EndTry)?;

        Ok(Stmt::Try {
            body: Box::new(body),
            handler_arms,
            token,
        })
    }

    /// `any` or a comma-separated list of error expressions
    fn parse_error_codes(&mut self) -> Result<Vec<Expr>> {
        if self.eat(TokenKind::Any) {
            return Ok(Vec::new());
        }
        let mut codes = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            codes.push(self.parse_expr()?);
        }
        Ok(codes)
    }

    // ==================== EXPRESSIONS ====================

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_assignment()
    }

    /// Right-associative `=`
    fn parse_assignment(&mut self) -> Result<Expr> {
        let left = self.parse_disjunction()?;

        if !self.at(TokenKind::Equal) {
            return Ok(left);
        }
        if !matches!(left, Expr::Identifier { .. }) {
            let target = left.token();
            return Err(ParseError::InvalidAssignment {
                position: target.position(),
                span: SourceSpan::from(target.span),
            });
        }

        let token = self.advance();
        let right = self.parse_assignment()?;
        Ok(Expr::Binary {
            left: Box::new(left),
            right: Box::new(right),
            op: BinaryOp::Assign,
            token,
        })
    }

    fn binary_op(&self, ops: &[(TokenKind, BinaryOp)]) -> Option<BinaryOp> {
        ops.iter()
            .find(|(kind, _)| self.at(*kind))
            .map(|(_, op)| *op)
    }

    /// `operand (op operand)*`, folded to the left
    fn chain(&mut self, ops: &[(TokenKind, BinaryOp)], operand: Rule) -> Result<Expr> {
        let mut left = operand(self)?;

        while let Some(op) = self.binary_op(ops) {
            let token = self.advance();
            let right = operand(self)?;
            left = Expr::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op,
                token,
            };
        }

        Ok(left)
    }

    fn parse_disjunction(&mut self) -> Result<Expr> {
        self.chain(DISJUNCTION, Parser::parse_conjunction)
    }

    fn parse_conjunction(&mut self) -> Result<Expr> {
        self.chain(CONJUNCTION, Parser::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        self.chain(COMPARISON, Parser::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        self.chain(ADDITIVE, Parser::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        self.chain(MULTIPLICATIVE, Parser::parse_property)
    }

    fn parse_property(&mut self) -> Result<Expr> {
        let mut expr = self.parse_unary()?;

        while self.at(TokenKind::Dot) {
            let token = self.advance();
            let (name, _) = self.parse_ident()?;
            expr = Expr::Property {
                object: Box::new(expr),
                name,
                token,
            };
        }

        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let token = self.advance();
        let right = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            right: Box::new(right),
            token,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let mut expr = self.parse_atom()?;

        // object:verb(args), chainable
        while self.at(TokenKind::Colon) {
            let token = self.advance();
            let (verb, _) = self.parse_ident()?;
            let args = self.parse_args()?;
            expr = Expr::VerbCall {
                object: Box::new(expr),
                verb,
                args,
                token,
            };
        }

        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.peek() {
            TokenKind::Identifier => {
                let token = self.advance();
                let callee = Expr::Identifier {
                    name: token.text.clone(),
                    token: token.clone(),
                };
                if self.at(TokenKind::LeftParen) {
                    self.parse_call(callee, token)
                } else {
                    Ok(callee)
                }
            }

            TokenKind::LeftParen => {
                let token = self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen)?;
                let grouping = Expr::Grouping {
                    inner: Box::new(inner),
                    token: token.clone(),
                };
                if self.at(TokenKind::LeftParen) {
                    self.parse_call(grouping, token)
                } else {
                    Ok(grouping)
                }
            }

            // $verb(args) is #0:verb(args); $name is #0.name
            TokenKind::Dollar => {
                let token = self.advance();
                let (name, _) = self.parse_ident()?;
                let system = Box::new(Expr::Literal {
                    value: Value::Object(0),
                    token: token.clone(),
                });
                if self.at(TokenKind::LeftParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::VerbCall {
                        object: system,
                        verb: name,
                        args,
                        token,
                    })
                } else {
                    Ok(Expr::Property {
                        object: system,
                        name,
                        token,
                    })
                }
            }

            TokenKind::LeftBrace => {
                let token = self.advance();
                let mut elements = Vec::new();
                while !self.at(TokenKind::RightBrace) {
                    elements.push(self.parse_expr()?);
                    if !self.at(TokenKind::RightBrace) {
                        self.expect(TokenKind::Comma)?;
                    }
                }
                self.expect(TokenKind::RightBrace)?;
                Ok(Expr::List { elements, token })
            }

            TokenKind::LeftBrack => self.parse_range(),

            TokenKind::Backtick => self.parse_try_expr(),

            TokenKind::Hash => {
                let token = self.advance();
                let negative = self.eat(TokenKind::Minus);
                let number = self.expect(TokenKind::Integer)?;
                // Negate before narrowing so #-2147483648 is reachable
                let id = number
                    .text
                    .parse::<i64>()
                    .ok()
                    .map(|n| if negative { -n } else { n })
                    .and_then(|n| ObjectId::try_from(n).ok())
                    .ok_or_else(|| ParseError::UnexpectedToken {
                        expected: "object number".to_string(),
                        found: format!("'{}'", number.text),
                        position: number.position(),
                        span: SourceSpan::from(number.span),
                    })?;
                Ok(Expr::Literal {
                    value: Value::Object(id),
                    token,
                })
            }

            TokenKind::Integer | TokenKind::Float | TokenKind::String => {
                let token = self.advance();
                let value = literal_value(&token)?;
                Ok(Expr::Literal { value, token })
            }

            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Literal {
                    value: Value::Boolean(token.kind == TokenKind::True),
                    token,
                })
            }

            _ => Err(self.error("expression")),
        }
    }

    fn parse_call(&mut self, callee: Expr, token: Token) -> Result<Expr> {
        let args = self.parse_args()?;
        Ok(Expr::FunctionCall {
            callee: Box::new(callee),
            args,
            token,
        })
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        while !self.at(TokenKind::RightParen) {
            args.push(self.parse_expr()?);
            if !self.at(TokenKind::RightParen) {
                self.expect(TokenKind::Comma)?;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args)
    }

    /// `[from..to]`
    fn parse_range(&mut self) -> Result<Expr> {
        let token = self.expect(TokenKind::LeftBrack)?;
        let from = self.parse_expr()?;
        self.expect(TokenKind::DotDot)?;
        let to = self.parse_expr()?;
        self.expect(TokenKind::RightBrack)?;
        Ok(Expr::Range {
            from: Box::new(from),
            to: Box::new(to),
            token,
        })
    }

    /// `` `expr ! codes => alternative' ``
    fn parse_try_expr(&mut self) -> Result<Expr> {
        let token = self.expect(TokenKind::Backtick)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Bang)?;
        let error_filters = self.parse_error_codes()?;
        self.expect(TokenKind::FatArrow)?;
        let alternative = self.parse_expr()?;
        self.expect(TokenKind::Quote)?;
        Ok(Expr::Try {
            expr: Box::new(expr),
            error_filters,
            alternative: Box::new(alternative),
            token,
        })
    }
}

// ==================== HELPERS ====================

/// How a token kind is named in an expectation message
fn describe(kind: TokenKind) -> String {
    match kind {
        TokenKind::Identifier => "identifier".to_string(),
        TokenKind::Integer => "integer".to_string(),
        TokenKind::Float => "float".to_string(),
        TokenKind::String => "string".to_string(),
        other => format!("'{}'", other.as_str()),
    }
}

/// Synthetic Eof placed just after the last real token
fn end_of_input(last: Option<&Token>) -> Token {
    let (offset, line, column) = match last {
        Some(tok) => {
            let (mut line, mut column) = (tok.line, tok.column);
            for c in tok.text.chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
            (tok.span.end, line, column)
        }
        None => (0, 1, 1),
    };
    Token {
        kind: TokenKind::Eof,
        span: Span::point(offset),
        text: String::new(),
        line,
        column,
    }
}

fn literal_value(token: &Token) -> Result<Value> {
    let malformed = |expected: &str| ParseError::UnexpectedToken {
        expected: expected.to_string(),
        found: format!("'{}'", token.text),
        position: token.position(),
        span: SourceSpan::from(token.span),
    };

    match token.kind {
        TokenKind::Integer => token
            .text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| malformed("integer")),
        TokenKind::Float => token
            .text
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| malformed("float")),
        TokenKind::String => Ok(Value::String(unescape(&token.text))),
        _ => Err(malformed("literal")),
    }
}

/// Strip the quotes from a string token and resolve its escapes
fn unescape(text: &str) -> String {
    let body = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#""a\"b""#), "a\"b");
        assert_eq!(unescape(r#""line\nnext""#), "line\nnext");
        assert_eq!(unescape(r#""back\\slash""#), "back\\slash");
        assert_eq!(unescape(r#""\q""#), "q");
    }

    #[test]
    fn test_end_of_input_position() {
        let eof = end_of_input(None);
        assert_eq!((eof.line, eof.column), (1, 1));
    }
}
