//! Capability views and operator dispatch
//!
//! The interpreter calls [`Value::apply_binary`] / [`Value::apply_unary`] and
//! never matches on kind pairs itself. Incompatible operands yield the
//! `E_TYPE` error value instead of failing.

use std::cmp::Ordering;

use super::{ErrorCode, ObjectId, Value, ValueKind};
use crate::ast::{BinaryOp, UnaryOp};

// ==================== FLOATABLE ====================

/// Integer or Float, viewed uniformly for arithmetic.
///
/// Integer op Integer stays Integer; any Float operand promotes the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Floatable {
    Integer(i64),
    Float(f64),
}

fn float_result(x: f64) -> Value {
    if x.is_finite() {
        Value::Float(x)
    } else {
        Value::Error(ErrorCode::Float)
    }
}

impl Floatable {
    pub fn of(value: &Value) -> Option<Floatable> {
        match value {
            Value::Integer(n) => Some(Floatable::Integer(*n)),
            Value::Float(x) => Some(Floatable::Float(*x)),
            _ => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Floatable::Integer(n) => n as f64,
            Floatable::Float(x) => x,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Floatable::Integer(n) => n == 0,
            Floatable::Float(x) => x == 0.0,
        }
    }

    pub fn add(self, rhs: Floatable) -> Value {
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Value::Integer(a.wrapping_add(b)),
            (a, b) => float_result(a.as_f64() + b.as_f64()),
        }
    }

    pub fn sub(self, rhs: Floatable) -> Value {
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Value::Integer(a.wrapping_sub(b)),
            (a, b) => float_result(a.as_f64() - b.as_f64()),
        }
    }

    pub fn mul(self, rhs: Floatable) -> Value {
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Value::Integer(a.wrapping_mul(b)),
            (a, b) => float_result(a.as_f64() * b.as_f64()),
        }
    }

    pub fn div(self, rhs: Floatable) -> Value {
        if rhs.is_zero() {
            return Value::Error(ErrorCode::Div);
        }
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Value::Integer(a.wrapping_div(b)),
            (a, b) => float_result(a.as_f64() / b.as_f64()),
        }
    }

    pub fn rem(self, rhs: Floatable) -> Value {
        if rhs.is_zero() {
            return Value::Error(ErrorCode::Div);
        }
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Value::Integer(a.wrapping_rem(b)),
            (a, b) => float_result(a.as_f64() % b.as_f64()),
        }
    }

    pub fn neg(self) -> Value {
        match self {
            Floatable::Integer(n) => Value::Integer(n.wrapping_neg()),
            Floatable::Float(x) => Value::Float(-x),
        }
    }

    pub fn compare(self, rhs: Floatable) -> Option<Ordering> {
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    pub fn min(self, rhs: Floatable) -> Value {
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Value::Integer(a.min(b)),
            (a, b) => float_result(a.as_f64().min(b.as_f64())),
        }
    }

    pub fn max(self, rhs: Floatable) -> Value {
        match (self, rhs) {
            (Floatable::Integer(a), Floatable::Integer(b)) => Value::Integer(a.max(b)),
            (a, b) => float_result(a.as_f64().max(b.as_f64())),
        }
    }

    /// Apply `f` as a Float function; out-of-domain results are `E_FLOAT`
    pub fn apply(self, f: MathFn) -> Value {
        float_result(f.eval(self.as_f64()))
    }
}

/// Single-argument math functions over [`Floatable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Floor,
    Ceil,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Log10,
}

impl MathFn {
    pub const ALL: [MathFn; 15] = [
        MathFn::Floor,
        MathFn::Ceil,
        MathFn::Sqrt,
        MathFn::Sin,
        MathFn::Cos,
        MathFn::Tan,
        MathFn::Asin,
        MathFn::Acos,
        MathFn::Atan,
        MathFn::Sinh,
        MathFn::Cosh,
        MathFn::Tanh,
        MathFn::Exp,
        MathFn::Log,
        MathFn::Log10,
    ];

    /// Builtin name
    pub fn name(self) -> &'static str {
        match self {
            MathFn::Floor => "floor",
            MathFn::Ceil => "ceil",
            MathFn::Sqrt => "sqrt",
            MathFn::Sin => "sin",
            MathFn::Cos => "cos",
            MathFn::Tan => "tan",
            MathFn::Asin => "asin",
            MathFn::Acos => "acos",
            MathFn::Atan => "atan",
            MathFn::Sinh => "sinh",
            MathFn::Cosh => "cosh",
            MathFn::Tanh => "tanh",
            MathFn::Exp => "exp",
            MathFn::Log => "log",
            MathFn::Log10 => "log10",
        }
    }

    pub fn eval(self, x: f64) -> f64 {
        match self {
            MathFn::Floor => x.floor(),
            MathFn::Ceil => x.ceil(),
            MathFn::Sqrt => x.sqrt(),
            MathFn::Sin => x.sin(),
            MathFn::Cos => x.cos(),
            MathFn::Tan => x.tan(),
            MathFn::Asin => x.asin(),
            MathFn::Acos => x.acos(),
            MathFn::Atan => x.atan(),
            MathFn::Sinh => x.sinh(),
            MathFn::Cosh => x.cosh(),
            MathFn::Tanh => x.tanh(),
            MathFn::Exp => x.exp(),
            MathFn::Log => x.ln(),
            MathFn::Log10 => x.log10(),
        }
    }
}

// ==================== ORDINAL ====================

/// A value with a total order and successor/predecessor:
/// Boolean, Character, Integer or Object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordinal {
    kind: ValueKind,
    value: i64,
}

impl Ordinal {
    pub fn of(value: &Value) -> Option<Ordinal> {
        let (kind, value) = match value {
            Value::Boolean(b) => (ValueKind::Boolean, i64::from(*b)),
            Value::Character(c) => (ValueKind::Character, i64::from(u32::from(*c))),
            Value::Integer(n) => (ValueKind::Integer, *n),
            Value::Object(id) => (ValueKind::Object, i64::from(*id)),
            _ => return None,
        };
        Some(Ordinal { kind, value })
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Rebuild a value of this ordinal's kind at position `value`
    fn at(&self, value: i64) -> Option<Value> {
        match self.kind {
            ValueKind::Boolean => match value {
                0 => Some(Value::FALSE),
                1 => Some(Value::TRUE),
                _ => None,
            },
            ValueKind::Character => u32::try_from(value)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Character),
            ValueKind::Integer => Some(Value::Integer(value)),
            ValueKind::Object => ObjectId::try_from(value).ok().map(Value::Object),
            _ => None,
        }
    }

    pub fn succ(&self) -> Value {
        match self.kind {
            // Booleans cycle
            ValueKind::Boolean => Value::Boolean(self.value == 0),
            ValueKind::Integer => Value::Integer(self.value.wrapping_add(1)),
            _ => self
                .at(self.value + 1)
                .unwrap_or(Value::Error(ErrorCode::Range)),
        }
    }

    pub fn pred(&self) -> Value {
        match self.kind {
            ValueKind::Boolean => Value::Boolean(self.value == 0),
            ValueKind::Integer => Value::Integer(self.value.wrapping_sub(1)),
            _ => self
                .at(self.value - 1)
                .unwrap_or(Value::Error(ErrorCode::Range)),
        }
    }

    pub fn ord(&self) -> Value {
        Value::Integer(self.value)
    }

    pub fn chr(&self) -> Value {
        u32::try_from(self.value)
            .ok()
            .and_then(char::from_u32)
            .map(Value::Character)
            .unwrap_or(Value::Error(ErrorCode::InvArg))
    }

    /// Ordering between ordinals of the same kind
    pub fn compare(&self, other: &Ordinal) -> Option<Ordering> {
        (self.kind == other.kind).then(|| self.value.cmp(&other.value))
    }

    /// The smaller of two same-kind ordinals; mixed kinds are `E_TYPE`
    pub fn min(&self, other: &Ordinal) -> Value {
        self.pick(other, Ordering::is_le)
    }

    /// The larger of two same-kind ordinals; mixed kinds are `E_TYPE`
    pub fn max(&self, other: &Ordinal) -> Value {
        self.pick(other, Ordering::is_ge)
    }

    fn pick(&self, other: &Ordinal, keep_self: fn(Ordering) -> bool) -> Value {
        let Some(ord) = self.compare(other) else {
            return Value::Error(ErrorCode::Type);
        };
        let value = if keep_self(ord) { self.value } else { other.value };
        self.at(value).unwrap_or(Value::Error(ErrorCode::Type))
    }

    /// Every value from `from` to `to` inclusive, as a List.
    ///
    /// Yields `E_TYPE` for mismatched kinds and `E_QUOTA` when the range
    /// would hold more than `limit` elements.
    pub fn range(from: &Value, to: &Value, limit: usize) -> Value {
        let (Some(lo), Some(hi)) = (Ordinal::of(from), Ordinal::of(to)) else {
            return Value::Error(ErrorCode::Type);
        };
        if lo.kind != hi.kind {
            return Value::Error(ErrorCode::Type);
        }
        if hi.value < lo.value {
            return Value::List(Vec::new());
        }
        let count = (hi.value as i128) - (lo.value as i128) + 1;
        if count > limit as i128 {
            return Value::Error(ErrorCode::Quota);
        }
        Value::List((lo.value..=hi.value).filter_map(|n| lo.at(n)).collect())
    }
}

// ==================== AGGREGATE ====================

/// An indexable, sliceable sequence: List or String.
///
/// Indices are 0-based and count characters for strings.
#[derive(Debug, Clone, Copy)]
pub enum Aggregate<'a> {
    List(&'a [Value]),
    String(&'a str),
}

impl<'a> Aggregate<'a> {
    pub fn of(value: &'a Value) -> Option<Aggregate<'a>> {
        match value {
            Value::List(xs) => Some(Aggregate::List(xs)),
            Value::String(s) => Some(Aggregate::String(s)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Aggregate::List(xs) => xs.len(),
            Aggregate::String(s) => s.chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Aggregate::List(xs) => xs.is_empty(),
            Aggregate::String(s) => s.is_empty(),
        }
    }

    /// Element at `index`, or `E_RANGE`
    pub fn at(&self, index: usize) -> Value {
        let element = match self {
            Aggregate::List(xs) => xs.get(index).cloned(),
            Aggregate::String(s) => s.chars().nth(index).map(Value::Character),
        };
        element.unwrap_or(Value::Error(ErrorCode::Range))
    }

    /// Elements in `from..to`, or `E_RANGE` when the bounds fall outside
    pub fn slice(&self, from: usize, to: usize) -> Value {
        if from > to || to > self.len() {
            return Value::Error(ErrorCode::Range);
        }
        match self {
            Aggregate::List(xs) => Value::List(xs[from..to].to_vec()),
            Aggregate::String(s) => Value::String(s.chars().skip(from).take(to - from).collect()),
        }
    }

    pub fn first(&self) -> Value {
        self.at(0)
    }

    /// Everything after the first element, or `E_RANGE` when empty
    pub fn rest(&self) -> Value {
        if self.is_empty() {
            return Value::Error(ErrorCode::Range);
        }
        self.slice(1, self.len())
    }

    pub fn uncons(&self) -> Option<(Value, Value)> {
        if self.is_empty() {
            None
        } else {
            Some((self.first(), self.rest()))
        }
    }

    /// Same-kind concatenation; mixed kinds are `E_TYPE`
    pub fn concat(&self, other: &Aggregate<'_>) -> Value {
        match (self, other) {
            (Aggregate::List(a), Aggregate::List(b)) => {
                Value::List(a.iter().chain(b.iter()).cloned().collect())
            }
            (Aggregate::String(a), Aggregate::String(b)) => Value::String(format!("{}{}", a, b)),
            _ => Value::Error(ErrorCode::Type),
        }
    }

    pub fn iter(&self) -> AggregateIter<'a> {
        match *self {
            Aggregate::List(xs) => AggregateIter::List(xs.iter()),
            Aggregate::String(s) => AggregateIter::String(s.chars()),
        }
    }
}

/// Iterator over the elements of an [`Aggregate`]
pub enum AggregateIter<'a> {
    List(std::slice::Iter<'a, Value>),
    String(std::str::Chars<'a>),
}

impl Iterator for AggregateIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            AggregateIter::List(it) => it.next().cloned(),
            AggregateIter::String(it) => it.next().map(Value::Character),
        }
    }
}

// ==================== OPERATORS ====================

impl Value {
    /// Evaluate a binary operator on two already-evaluated operands.
    ///
    /// `Assign` is not a value operation; the interpreter handles it before
    /// operands are evaluated.
    pub fn apply_binary(&self, op: BinaryOp, rhs: &Value) -> Value {
        match op {
            BinaryOp::Add => self.add(rhs),
            BinaryOp::Sub => self.arith(rhs, Floatable::sub),
            BinaryOp::Mul => self.arith(rhs, Floatable::mul),
            BinaryOp::Div => self.arith(rhs, Floatable::div),
            BinaryOp::Rem => self.arith(rhs, Floatable::rem),
            BinaryOp::Eq => Value::Boolean(self == rhs),
            BinaryOp::Ne => Value::Boolean(self != rhs),
            BinaryOp::Lt => self.ordering(rhs, Ordering::is_lt),
            BinaryOp::Le => self.ordering(rhs, Ordering::is_le),
            BinaryOp::Gt => self.ordering(rhs, Ordering::is_gt),
            BinaryOp::Ge => self.ordering(rhs, Ordering::is_ge),
            BinaryOp::And => Value::Boolean(self.is_truthy() && rhs.is_truthy()),
            BinaryOp::Or => Value::Boolean(self.is_truthy() || rhs.is_truthy()),
            BinaryOp::Xor => Value::Boolean(self.is_truthy() ^ rhs.is_truthy()),
            BinaryOp::Assign => Value::Error(ErrorCode::Type),
        }
    }

    pub fn apply_unary(&self, op: UnaryOp) -> Value {
        match op {
            UnaryOp::Not => Value::Boolean(!self.is_truthy()),
            UnaryOp::Neg => match Floatable::of(self) {
                Some(n) => n.neg(),
                None => Value::Error(ErrorCode::Type),
            },
        }
    }

    /// `+`: numeric addition, aggregate concatenation, or string building
    /// when the left side is a String.
    pub fn add(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::String(a), Value::String(b)) => Value::String(format!("{}{}", a, b)),
            (Value::String(a), other) => Value::String(format!("{}{}", a, other)),
            (Value::List(_), Value::List(_)) => match (Aggregate::of(self), Aggregate::of(rhs)) {
                (Some(a), Some(b)) => a.concat(&b),
                _ => Value::Error(ErrorCode::Type),
            },
            _ => self.arith(rhs, Floatable::add),
        }
    }

    fn arith(&self, rhs: &Value, op: fn(Floatable, Floatable) -> Value) -> Value {
        match (Floatable::of(self), Floatable::of(rhs)) {
            (Some(a), Some(b)) => op(a, b),
            _ => Value::Error(ErrorCode::Type),
        }
    }

    /// Total order where one exists: numbers, same-kind ordinals, strings
    pub fn compare(&self, rhs: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (Floatable::of(self), Floatable::of(rhs)) {
            return a.compare(b);
        }
        if let (Some(a), Some(b)) = (Ordinal::of(self), Ordinal::of(rhs)) {
            return a.compare(&b);
        }
        match (self, rhs) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Smaller of two values under [`Value::compare`], or `E_TYPE`.
    ///
    /// Numbers keep the Integer/Float promotion of arithmetic.
    pub fn min(&self, rhs: &Value) -> Value {
        if let (Some(a), Some(b)) = (Floatable::of(self), Floatable::of(rhs)) {
            return a.min(b);
        }
        if let (Some(a), Some(b)) = (Ordinal::of(self), Ordinal::of(rhs)) {
            return a.min(&b);
        }
        match (self, rhs) {
            (Value::String(a), Value::String(b)) => Value::String(a.min(b).clone()),
            _ => Value::Error(ErrorCode::Type),
        }
    }

    /// Larger of two values under [`Value::compare`], or `E_TYPE`
    pub fn max(&self, rhs: &Value) -> Value {
        if let (Some(a), Some(b)) = (Floatable::of(self), Floatable::of(rhs)) {
            return a.max(b);
        }
        if let (Some(a), Some(b)) = (Ordinal::of(self), Ordinal::of(rhs)) {
            return a.max(&b);
        }
        match (self, rhs) {
            (Value::String(a), Value::String(b)) => Value::String(a.max(b).clone()),
            _ => Value::Error(ErrorCode::Type),
        }
    }

    fn ordering(&self, rhs: &Value, test: fn(Ordering) -> bool) -> Value {
        match self.compare(rhs) {
            Some(ord) => Value::Boolean(test(ord)),
            None => Value::Error(ErrorCode::Type),
        }
    }
}
