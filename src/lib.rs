//! Oxi: a small MOO-style scripting language
//!
//! Integer object references, property and verb syntax, and a fixed catalog
//! of runtime error codes that travel as values until something demands a
//! real one.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter → Value
//!                                     ↑
//!                      builtins, object store, runtime
//! ```
//!
//! Values can be serialized independently with [`codec`].
//!
//! # Example
//!
//! ```text
//! total = 0;
//! for i in [1..10]
//!   total = total + i;
//! endfor
//! return `total / 0 ! E_DIV => total';
//! ```

pub mod ast;
pub mod codec;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod value;

// Re-exports for convenience
pub use ast::{Expr, Stmt};
pub use config::Config;
pub use diagnostics::{OxiError, SourceFile};
pub use interp::{Fault, Interpreter};
pub use value::{ErrorCode, Value};

/// Interpreter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const INLINE_SOURCE: &str = "<input>";

/// Tokenize source code
pub fn tokenize(source: &str) -> miette::Result<Vec<lexer::Token>> {
    let file = SourceFile::new(INLINE_SOURCE, source);
    lexer::lex(source).map_err(|e| file.report(e))
}

/// Parse source code to a program block
pub fn parse(source: &str) -> miette::Result<Stmt> {
    let file = SourceFile::new(INLINE_SOURCE, source);
    let tokens = lexer::lex(source).map_err(|e| file.report(e))?;
    parser::parse_program(&tokens).map_err(|e| file.report(e))
}

/// Run source code with a fresh interpreter
pub fn run(source: &str) -> miette::Result<Value> {
    let file = SourceFile::new(INLINE_SOURCE, source);
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter, source).map_err(|e| file.report(e))
}

/// Run source code as one call body on an existing interpreter
pub fn run_with(interpreter: &mut Interpreter, source: &str) -> Result<Value, OxiError> {
    let tokens = lexer::lex(source)?;
    let program = parser::parse_program(&tokens)?;
    Ok(interpreter.run(&program)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_run_reports_with_source() {
        let report = run("1 + \"x\"").unwrap_err();
        assert!(report.source_code().is_some());
    }
}
