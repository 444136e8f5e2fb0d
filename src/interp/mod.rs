//! Tree-walking interpreter
//!
//! Evaluates the AST directly against a scope stack, a builtin registry and
//! the object-store collaborators.

pub mod builtins;
pub mod env;
pub mod eval;
pub mod store;

pub use builtins::{Builtin, Builtins};
pub use env::Environment;
pub use eval::{Fault, Flow, Interpreter};
pub use store::{Kernel, MemoryStore, ObjectStore, Runtime, SharedStore};
