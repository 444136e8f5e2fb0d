//! Abstract Syntax Tree for the Oxi language
//!
//! This module defines the AST types produced by the parser. Every node owns
//! its children and keeps the token it was built from for diagnostics.

use crate::lexer::Token;
use crate::value::Value;
use serde::{Deserialize, Serialize};

// ==================== OPERATORS ====================

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Assign,
    Or,
    Xor,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::Or => "||",
            BinaryOp::Xor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

// ==================== EXPRESSIONS ====================

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        right: Box<Expr>,
        op: BinaryOp,
        token: Token,
    },
    Unary {
        op: UnaryOp,
        right: Box<Expr>,
        token: Token,
    },
    Grouping {
        inner: Box<Expr>,
        token: Token,
    },
    Literal {
        value: Value,
        token: Token,
    },
    Identifier {
        name: String,
        token: Token,
    },
    List {
        elements: Vec<Expr>,
        token: Token,
    },
    /// `[from..to]`
    Range {
        from: Box<Expr>,
        to: Box<Expr>,
        token: Token,
    },
    /// `object.name`
    Property {
        object: Box<Expr>,
        name: String,
        token: Token,
    },
    FunctionCall {
        callee: Box<Expr>,
        args: Vec<Expr>,
        token: Token,
    },
    /// `object:verb(args)`
    VerbCall {
        object: Box<Expr>,
        verb: String,
        args: Vec<Expr>,
        token: Token,
    },
    /// `` `expr ! codes => alternative' ``; an empty filter list catches any error
    Try {
        expr: Box<Expr>,
        error_filters: Vec<Expr>,
        alternative: Box<Expr>,
        token: Token,
    },
}

impl Expr {
    /// The token this node was built from
    pub fn token(&self) -> &Token {
        match self {
            Expr::Binary { token, .. }
            | Expr::Unary { token, .. }
            | Expr::Grouping { token, .. }
            | Expr::Literal { token, .. }
            | Expr::Identifier { token, .. }
            | Expr::List { token, .. }
            | Expr::Range { token, .. }
            | Expr::Property { token, .. }
            | Expr::FunctionCall { token, .. }
            | Expr::VerbCall { token, .. }
            | Expr::Try { token, .. } => token,
        }
    }
}

// ==================== STATEMENTS ====================

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    ExprStmt {
        expr: Expr,
    },
    Block {
        statements: Vec<Stmt>,
    },
    Return {
        expr: Expr,
        token: Token,
    },
    /// Arm `i` pairs `conditions[i]` with `consequences[i]`
    If {
        conditions: Vec<Expr>,
        consequences: Vec<Stmt>,
        else_branch: Option<Box<Stmt>>,
        token: Token,
    },
    For {
        loop_var: String,
        iterable: Expr,
        body: Box<Stmt>,
        token: Token,
    },
    Try {
        body: Box<Stmt>,
        handler_arms: Vec<HandlerArm>,
        token: Token,
    },
}

/// One `except` arm of a try statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerArm {
    /// Variable bound to the caught error value
    pub binding: Option<String>,
    /// Empty means `any`
    pub errors: Vec<Expr>,
    pub body: Stmt,
    pub token: Token,
}
