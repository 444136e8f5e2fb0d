//! Tree-walking interpreter
//!
//! Errors are ordinary values while an expression is being evaluated. They
//! only become a [`Fault`] where a context demands a non-error value: an
//! operand of arithmetic or ordering, a range bound, a condition, a `for`
//! iterable, or the value of an expression statement.

use std::rc::Rc;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::*;
use crate::common::Position;
use crate::config::Config;
use crate::lexer::Token;
use crate::value::{Aggregate, ErrorCode, Ordinal, Value, ValueKind};

use super::builtins::Builtins;
use super::env::Environment;
use super::store::{Kernel, MemoryStore, Runtime, SharedStore};

/// Runtime failure that escaped expression evaluation
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum Fault {
    /// An error value reached a context that does not accept one
    #[error("{code} at {position}")]
    #[diagnostic(code(runtime::raised))]
    Raised {
        code: ErrorCode,
        position: Position,
        #[label("raised here")]
        span: SourceSpan,
    },

    #[error("Unknown function `{name}` at {position}")]
    #[diagnostic(code(runtime::unknown_function), help("only registered builtins can be called"))]
    UnknownFunction {
        name: String,
        position: Position,
        #[label("not a builtin")]
        span: SourceSpan,
    },

    #[error("{what} is not implemented at {position}")]
    #[diagnostic(code(runtime::unimplemented))]
    Unimplemented {
        what: String,
        position: Position,
        #[label("not implemented")]
        span: SourceSpan,
    },
}

impl Fault {
    fn raised(code: ErrorCode, token: &Token) -> Self {
        Fault::Raised {
            code,
            position: token.position(),
            span: SourceSpan::from(token.span),
        }
    }

    /// Catalog code of a raised error
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Fault::Raised { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Fault::Raised { position, .. }
            | Fault::UnknownFunction { position, .. }
            | Fault::Unimplemented { position, .. } => *position,
        }
    }
}

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Ran to the end, producing a value
    Completed(Value),
    /// Hit `return`; unwinds to the enclosing call boundary
    Returned(Value),
}

impl Flow {
    pub fn into_value(self) -> Value {
        match self {
            Flow::Completed(v) | Flow::Returned(v) => v,
        }
    }
}

/// Tree-walking interpreter
pub struct Interpreter {
    /// Variable environment
    env: Environment,
    /// Callable builtins
    builtins: Builtins,
    store: SharedStore,
    runtime: Rc<dyn Runtime>,
    config: Config,
}

impl Interpreter {
    /// Create an interpreter over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_store(MemoryStore::shared(), config)
    }

    /// Use an existing object store, with the default runtime over it
    pub fn with_store(store: SharedStore, config: Config) -> Self {
        let runtime: Rc<dyn Runtime> = Rc::new(Kernel::new(store.clone()));
        Self::with_runtime(store, runtime, config)
    }

    pub fn with_runtime(store: SharedStore, runtime: Rc<dyn Runtime>, config: Config) -> Self {
        Interpreter {
            env: Environment::new(),
            builtins: Builtins::standard(store.clone(), runtime.clone()),
            store,
            runtime,
            config,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Builtin registry, for registering extra functions
    pub fn builtins_mut(&mut self) -> &mut Builtins {
        &mut self.builtins
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Run a call body in a fresh scope.
    ///
    /// A `return` anywhere in the body ends it early; its value becomes the
    /// result. Otherwise the result is the value of the last statement.
    pub fn run(&mut self, body: &Stmt) -> Result<Value, Fault> {
        self.env.push_scope();
        tracing::debug!("Entered call scope at depth {}", self.env.depth());

        let result = self.exec(body);

        self.env.pop_scope();
        tracing::debug!("Left call scope, depth {}", self.env.depth());

        match result {
            Ok(flow) => Ok(flow.into_value()),
            Err(fault) => {
                tracing::warn!("Fault escaped call scope: {}", fault);
                Err(fault)
            }
        }
    }

    /// Evaluate an expression in the current scope. Error values are
    /// returned as data unless a nested context raised them.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, Fault> {
        self.eval_expr(expr)
    }

    // ==================== STATEMENTS ====================

    fn exec(&mut self, stmt: &Stmt) -> Result<Flow, Fault> {
        match stmt {
            Stmt::ExprStmt { expr } => {
                let value = self.eval_expr(expr)?;
                Ok(Flow::Completed(demand(value, expr.token())?))
            }

            Stmt::Block { statements } => {
                let mut last = Value::Integer(0);
                for stmt in statements {
                    match self.exec(stmt)? {
                        Flow::Completed(v) => last = v,
                        returned @ Flow::Returned(_) => return Ok(returned),
                    }
                }
                Ok(Flow::Completed(last))
            }

            Stmt::Return { expr, .. } => Ok(Flow::Returned(self.eval_expr(expr)?)),

            Stmt::If {
                conditions,
                consequences,
                else_branch,
                ..
            } => {
                for (condition, consequence) in conditions.iter().zip(consequences) {
                    let value = self.eval_expr(condition)?;
                    if demand(value, condition.token())?.is_truthy() {
                        return self.exec(consequence);
                    }
                }
                match else_branch {
                    Some(branch) => self.exec(branch),
                    None => Ok(Flow::Completed(Value::FALSE)),
                }
            }

            Stmt::For {
                loop_var,
                iterable,
                body,
                ..
            } => {
                let value = self.eval_expr(iterable)?;
                let value = demand(value, iterable.token())?;
                let elements: Vec<Value> = match Aggregate::of(&value) {
                    Some(agg) => agg.iter().collect(),
                    None => return Err(Fault::raised(ErrorCode::Type, iterable.token())),
                };
                tracing::trace!("for {} over {} elements", loop_var, elements.len());

                let mut last = Value::FALSE;
                for element in elements {
                    self.env.define(loop_var.as_str(), element);
                    match self.exec(body)? {
                        Flow::Completed(v) => last = v,
                        returned @ Flow::Returned(_) => return Ok(returned),
                    }
                }
                Ok(Flow::Completed(last))
            }

            Stmt::Try {
                body, handler_arms, ..
            } => {
                let fault = match self.exec(body) {
                    Err(fault @ Fault::Raised { .. }) => fault,
                    other => return other,
                };
                let Some(code) = fault.error_code() else {
                    return Err(fault);
                };

                for arm in handler_arms {
                    if self.error_matches(&arm.errors, code)? {
                        tracing::debug!("Caught {} at {}", code.name(), fault.position());
                        if let Some(name) = &arm.binding {
                            self.env.define(name.as_str(), Value::Error(code));
                        }
                        return self.exec(&arm.body);
                    }
                }
                Err(fault)
            }
        }
    }

    /// Whether `code` is selected by a handler's filter list; an empty list
    /// (`any`) selects every code.
    fn error_matches(&mut self, filters: &[Expr], code: ErrorCode) -> Result<bool, Fault> {
        if filters.is_empty() {
            return Ok(true);
        }
        for filter in filters {
            if self.eval_expr(filter)? == Value::Error(code) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ==================== EXPRESSIONS ====================

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Fault> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),

            Expr::Identifier { name, .. } => {
                Ok(self.env.get(name).unwrap_or(Value::Error(ErrorCode::VarNf)))
            }

            Expr::Grouping { inner, .. } => self.eval_expr(inner),

            Expr::List { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::List(values))
            }

            Expr::Range { from, to, .. } => {
                let lo = self.eval_demanded(from)?;
                let hi = self.eval_demanded(to)?;
                let range = Ordinal::range(&lo, &hi, self.config.max_range_len);
                Ok(self.filter_valid(lo.kind(), range))
            }

            Expr::Unary { op, right, .. } => {
                let value = match op {
                    UnaryOp::Not => self.eval_expr(right)?,
                    UnaryOp::Neg => self.eval_demanded(right)?,
                };
                Ok(value.apply_unary(*op))
            }

            Expr::Binary {
                left,
                right,
                op,
                token,
            } => self.eval_binary(*op, left, right, token),

            Expr::Property { object, name, .. } => {
                let receiver = self.eval_demanded(object)?;
                Ok(match receiver {
                    Value::Object(id) => self
                        .store
                        .borrow()
                        .get_property(id, name)
                        .unwrap_or_else(Value::Error),
                    _ => Value::Error(ErrorCode::Type),
                })
            }

            Expr::FunctionCall {
                callee,
                args,
                token,
            } => {
                let name = match callee.as_ref() {
                    Expr::Identifier { name, .. } => name.clone(),
                    other => match self.eval_demanded(other)? {
                        Value::String(name) => name,
                        _ => return Err(Fault::raised(ErrorCode::Type, other.token())),
                    },
                };
                let args = self.eval_args(args)?;
                self.call_function(&name, &args, token)
            }

            Expr::VerbCall {
                object,
                verb,
                args,
                token,
            } => {
                let receiver = self.eval_expr(object)?;
                let _args = self.eval_args(args)?;
                tracing::debug!("Verb call {}:{} has no dispatcher", receiver, verb);
                Err(Fault::Unimplemented {
                    what: format!("verb call `{}`", verb),
                    position: token.position(),
                    span: SourceSpan::from(token.span),
                })
            }

            Expr::Try {
                expr,
                error_filters,
                alternative,
                ..
            } => {
                let outcome = self.eval_expr(expr);
                let code = match &outcome {
                    Ok(Value::Error(code)) | Err(Fault::Raised { code, .. }) => *code,
                    _ => return outcome,
                };
                if self.error_matches(error_filters, code)? {
                    self.eval_expr(alternative)
                } else {
                    outcome
                }
            }
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, token: &Token) -> Result<Value, Fault> {
        match op {
            BinaryOp::Assign => {
                let Expr::Identifier { name, .. } = left else {
                    return Err(Fault::raised(ErrorCode::Type, token));
                };
                let value = self.eval_expr(right)?;
                self.env.define(name.as_str(), value.clone());
                Ok(value)
            }

            // Short-circuit for And/Or
            BinaryOp::And => {
                if !self.eval_expr(left)?.is_truthy() {
                    return Ok(Value::FALSE);
                }
                Ok(Value::Boolean(self.eval_expr(right)?.is_truthy()))
            }
            BinaryOp::Or => {
                if self.eval_expr(left)?.is_truthy() {
                    return Ok(Value::TRUE);
                }
                Ok(Value::Boolean(self.eval_expr(right)?.is_truthy()))
            }

            // Errors compare as data
            BinaryOp::Xor | BinaryOp::Eq | BinaryOp::Ne => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                Ok(lhs.apply_binary(op, &rhs))
            }

            _ => {
                let lhs = self.eval_demanded(left)?;
                let rhs = self.eval_demanded(right)?;
                Ok(lhs.apply_binary(op, &rhs))
            }
        }
    }

    fn eval_demanded(&mut self, expr: &Expr) -> Result<Value, Fault> {
        let value = self.eval_expr(expr)?;
        demand(value, expr.token())
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, Fault> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    fn call_function(&mut self, name: &str, args: &[Value], token: &Token) -> Result<Value, Fault> {
        tracing::trace!("Calling builtin {}({} args)", name, args.len());
        self.builtins
            .call(name, args)
            .ok_or_else(|| Fault::UnknownFunction {
                name: name.to_string(),
                position: token.position(),
                span: SourceSpan::from(token.span),
            })
    }

    /// Drop dead objects from an object range
    fn filter_valid(&self, kind: ValueKind, range: Value) -> Value {
        match range {
            Value::List(xs) if kind == ValueKind::Object => Value::List(
                xs.into_iter()
                    .filter(|x| self.runtime.valid(std::slice::from_ref(x)).is_truthy())
                    .collect(),
            ),
            other => other,
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Raise an error value at `token`, pass anything else through
fn demand(value: Value, token: &Token) -> Result<Value, Fault> {
    match value {
        Value::Error(code) => Err(Fault::raised(code, token)),
        other => Ok(other),
    }
}
