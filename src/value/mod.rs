//! Runtime values
//!
//! `Value` is the tagged datum every stage of the interpreter passes around.
//! Kind-specific behaviour is grouped into capability views in [`ops`]:
//! Floatable (Integer, Float), Ordinal (Boolean, Character, Integer, Object)
//! and Aggregate (List, String).

mod error;
pub mod ops;

pub use error::ErrorCode;
pub use ops::{Aggregate, Floatable, MathFn, Ordinal};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entity in the object store
pub type ObjectId = i32;

/// Kind tag of a value.
///
/// The discriminants are what `typeof` returns and what the binary codec
/// writes in front of each value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ValueKind {
    None = 0,
    Return = 1,
    Boolean = 2,
    Character = 3,
    Integer = 4,
    Float = 5,
    String = 6,
    Object = 7,
    List = 8,
    Error = 100,
}

impl ValueKind {
    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn from_tag(tag: i32) -> Option<ValueKind> {
        let kind = match tag {
            0 => ValueKind::None,
            1 => ValueKind::Return,
            2 => ValueKind::Boolean,
            3 => ValueKind::Character,
            4 => ValueKind::Integer,
            5 => ValueKind::Float,
            6 => ValueKind::String,
            7 => ValueKind::Object,
            8 => ValueKind::List,
            100 => ValueKind::Error,
            _ => return None,
        };
        Some(kind)
    }

    /// Script-visible constant naming this kind, if there is one
    pub fn constant_name(self) -> Option<&'static str> {
        match self {
            ValueKind::Boolean => Some("BOOL"),
            ValueKind::Character => Some("CHAR"),
            ValueKind::Integer => Some("INT"),
            ValueKind::Float => Some("FLOAT"),
            ValueKind::String => Some("STRING"),
            ValueKind::Object => Some("OBJ"),
            ValueKind::List => Some("LIST"),
            ValueKind::Error => Some("ERR"),
            ValueKind::None | ValueKind::Return => None,
        }
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit float
    Float(f64),
    Character(char),
    String(String),
    /// Reference to an object in the store
    Object(ObjectId),
    List(Vec<Value>),
    /// An entry of the error catalog
    Error(ErrorCode),
    /// A value travelling out of a call body
    Return(Box<Value>),
}

impl Value {
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Character(_) => ValueKind::Character,
            Value::String(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Object,
            Value::List(_) => ValueKind::List,
            Value::Error(_) => ValueKind::Error,
            Value::Return(_) => ValueKind::Return,
        }
    }

    /// Check if value is truthy.
    ///
    /// Object references are never truthy: whether an object is usable is
    /// decided by the store's validity check, not by holding a reference.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Character(c) => *c != '\0',
            Value::String(s) => !s.is_empty(),
            Value::List(xs) => !xs.is_empty(),
            Value::Object(_) => false,
            Value::Error(_) => false,
            Value::Return(inner) => inner.is_truthy(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Try to get as error code
    pub fn as_error(&self) -> Option<ErrorCode> {
        match self {
            Value::Error(code) => Some(*code),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get as object id
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Strip any number of `Return` wrappers
    pub fn unwrap_return(self) -> Value {
        match self {
            Value::Return(inner) => inner.unwrap_return(),
            other => other,
        }
    }

    /// Render the value as it would be written in source.
    ///
    /// Unlike `Display`, strings are quoted and errors print their constant
    /// name, so list elements stay unambiguous.
    pub fn to_literal(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s),
            Value::Character(c) => format!("'{}'", c),
            Value::Error(code) => code.name().to_string(),
            Value::List(xs) => {
                let parts: Vec<String> = xs.iter().map(Value::to_literal).collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Return(inner) => inner.to_literal(),
            other => other.to_string(),
        }
    }
}

fn fmt_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => f.write_str(&fmt_float(*x)),
            Value::Character(c) => write!(f, "{}", c),
            Value::String(s) => f.write_str(s),
            Value::Object(id) => write!(f, "#{}", id),
            Value::List(_) => f.write_str(&self.to_literal()),
            Value::Error(code) => write!(f, "{}", code),
            Value::Return(inner) => write!(f, "{}", inner),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ErrorCode> for Value {
    fn from(code: ErrorCode) -> Self {
        Value::Error(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_never_truthy() {
        assert!(!Value::Object(0).is_truthy());
        assert!(!Value::Object(42).is_truthy());
    }

    #[test]
    fn test_truthiness_per_kind() {
        assert!(Value::TRUE.is_truthy());
        assert!(!Value::FALSE.is_truthy());
        assert!(Value::Integer(-1).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::Error(ErrorCode::None).is_truthy());
        assert!(Value::Return(Box::new(Value::Integer(1))).is_truthy());
    }

    #[test]
    fn test_structural_equality() {
        let a = Value::List(vec![Value::Integer(1), Value::List(vec![Value::from("x")])]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(Value::Integer(1), Value::Float(1.0));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Float(7.0).to_string(), "7.0");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Object(3).to_string(), "#3");
        assert_eq!(Value::Error(ErrorCode::Type).to_string(), "Type mismatch");
        assert_eq!(
            Value::List(vec![Value::Integer(1), Value::from("a")]).to_string(),
            "{1, \"a\"}"
        );
    }

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in [
            ValueKind::Boolean,
            ValueKind::Integer,
            ValueKind::List,
            ValueKind::Error,
        ] {
            assert_eq!(ValueKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ValueKind::from_tag(9), None);
    }
}
