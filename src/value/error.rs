//! The fixed catalog of runtime error codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language-level error identity.
///
/// Error values are only ever drawn from this catalog; there is no way to
/// build one with arbitrary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    None,
    Type,
    Div,
    Perm,
    PropNf,
    VerbNf,
    VarNf,
    InvInd,
    RecMove,
    MaxRec,
    Range,
    Args,
    NAcc,
    InvArg,
    Quota,
    Float,
}

impl ErrorCode {
    /// Every code, in catalog order
    pub const ALL: [ErrorCode; 16] = [
        ErrorCode::None,
        ErrorCode::Type,
        ErrorCode::Div,
        ErrorCode::Perm,
        ErrorCode::PropNf,
        ErrorCode::VerbNf,
        ErrorCode::VarNf,
        ErrorCode::InvInd,
        ErrorCode::RecMove,
        ErrorCode::MaxRec,
        ErrorCode::Range,
        ErrorCode::Args,
        ErrorCode::NAcc,
        ErrorCode::InvArg,
        ErrorCode::Quota,
        ErrorCode::Float,
    ];

    /// Script-visible constant name, e.g. `E_TYPE`
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::None => "E_NONE",
            ErrorCode::Type => "E_TYPE",
            ErrorCode::Div => "E_DIV",
            ErrorCode::Perm => "E_PERM",
            ErrorCode::PropNf => "E_PROPNF",
            ErrorCode::VerbNf => "E_VERBNF",
            ErrorCode::VarNf => "E_VARNF",
            ErrorCode::InvInd => "E_INVIND",
            ErrorCode::RecMove => "E_RECMOVE",
            ErrorCode::MaxRec => "E_MAXREC",
            ErrorCode::Range => "E_RANGE",
            ErrorCode::Args => "E_ARGS",
            ErrorCode::NAcc => "E_NACC",
            ErrorCode::InvArg => "E_INVARG",
            ErrorCode::Quota => "E_QUOTA",
            ErrorCode::Float => "E_FLOAT",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::None => "No error",
            ErrorCode::Type => "Type mismatch",
            ErrorCode::Div => "Division by zero",
            ErrorCode::Perm => "Permission denied",
            ErrorCode::PropNf => "Property not found",
            ErrorCode::VerbNf => "Verb not found",
            ErrorCode::VarNf => "Variable not found",
            ErrorCode::InvInd => "Invalid indirection",
            ErrorCode::RecMove => "Recursive move",
            ErrorCode::MaxRec => "Too many verb calls",
            ErrorCode::Range => "Range error",
            ErrorCode::Args => "Incorrect number of arguments",
            ErrorCode::NAcc => "Move refused by destination",
            ErrorCode::InvArg => "Invalid argument",
            ErrorCode::Quota => "Resource limit exceeded",
            ErrorCode::Float => "Floating-point arithmetic error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
